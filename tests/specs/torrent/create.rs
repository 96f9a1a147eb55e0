//! `relprep create-torrent` specs

use crate::prelude::*;

const CONFIG: &str = r#"
[trackers.abc]
announce = "https://abc.example/announce/secret"
source = "ABC"
exclude = ['\.nfo$']
"#;

#[test]
fn creates_torrent_in_project_dir() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    let output = project
        .relprep()
        .args(&["create-torrent", "foo.mkv", "--tracker", "dummy"])
        .passes()
        .stdout_has("foo.mkv.relprep/foo.mkv.dummy.torrent");

    let torrent = project.path().join("foo.mkv.relprep/foo.mkv.dummy.torrent");
    assert_eq!(output.stdout_lines().len(), 1);
    let bytes = std::fs::read(&torrent).unwrap();
    assert!(bytes.starts_with(b"d8:announce37:http://localhost:12345/dummy/announce"));
    assert!(bytes.windows(10).any(|w| w == b"7:privatei"));
}

#[test]
fn tracker_settings_come_from_config() {
    let project = Project::empty();
    project.config(CONFIG);
    project.file("Foo/foo.mkv", "video data");
    project.file("Foo/foo.nfo", "info");

    project.relprep().args(&["create-torrent", "Foo", "--tracker", "ABC"]).passes();

    let bytes = std::fs::read(project.path().join("Foo.relprep/Foo.abc.torrent")).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("https://abc.example/announce/secret"));
    assert!(text.contains("6:source3:ABC"));
    assert!(text.contains("foo.mkv"));
    assert!(!text.contains("foo.nfo"));
}

#[test]
fn copies_torrent_to_directory() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");
    let watch = project.dir("watch");

    project
        .relprep()
        .args(&["create-torrent", "foo.mkv", "--tracker", "dummy", "--copy-to", watch.to_str().unwrap()])
        .passes()
        .stdout_has("foo.mkv.relprep/foo.mkv.dummy.torrent")
        .stdout_has(&watch.join("foo.mkv.dummy.torrent").display().to_string());

    assert!(watch.join("foo.mkv.dummy.torrent").is_file());
}

#[test]
fn adds_torrent_to_client() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    let output = project
        .relprep()
        .args(&["create-torrent", "foo.mkv", "--tracker", "dummy", "--add-to", "dummy"])
        .passes();

    assert_eq!(output.stdout_lines().last(), Some(&"123"));
}

#[test]
fn existing_torrent_is_reused() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");
    let args = ["create-torrent", "foo.mkv", "--tracker", "dummy"];

    let first = project.relprep().args(&args).passes();
    let second = project.relprep().args(&args).passes();
    let third = project.relprep().args(&["--ignore-cache"]).args(&args).passes();

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stdout, third.stdout);
}

#[test]
fn empty_content_fails() {
    let project = Project::empty();
    project.dir("Empty");

    project
        .relprep()
        .args(&["create-torrent", "Empty", "--tracker", "dummy"])
        .fails_with(1)
        .stderr_has("Empty directory");
}

#[test]
fn empty_announce_fails() {
    let project = Project::empty();
    project.config("[trackers.bare]\n");
    project.file("foo.mkv", "video data");

    project
        .relprep()
        .args(&["create-torrent", "foo.mkv", "--tracker", "bare"])
        .fails_with(1)
        .stderr_has("Announce URL is empty");
}
