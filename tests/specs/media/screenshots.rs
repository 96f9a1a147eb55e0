//! `relprep screenshots` specs

use crate::prelude::*;

#[test]
fn creates_default_number_of_screenshots() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    let output = project.relprep_with_media_tools(100.0).args(&["screenshots", "foo.mkv"]).passes();

    let home = project.path().join("foo.mkv.relprep");
    assert_eq!(
        output.stdout_lines(),
        vec![
            home.join("foo.mkv.0:00:50.png").display().to_string(),
            home.join("foo.mkv.0:01:15.png").display().to_string(),
        ]
    );
    assert!(home.join("foo.mkv.0:00:50.png").is_file());
}

#[test]
fn given_timestamps_are_filled_up_to_number() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    let output = project
        .relprep_with_media_tools(100.0)
        .args(&["screenshots", "foo.mkv", "--timestamps", "0:25", "--number", "2"])
        .passes()
        .stdout_has("foo.mkv.0:00:25.png")
        .stdout_has("foo.mkv.0:01:02.png");

    assert_eq!(output.stdout_lines().len(), 2);
}

#[test]
fn invalid_timestamp_is_a_usage_error() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    project
        .relprep_with_media_tools(100.0)
        .args(&["screenshots", "foo.mkv", "--timestamps", "soon"])
        .fails_with(2)
        .stderr_has("Invalid timestamp");
}

#[test]
fn content_without_video_fails() {
    let project = Project::empty();
    project.file("Foo/readme.txt", "text");

    project
        .relprep_with_media_tools(100.0)
        .args(&["screenshots", "Foo"])
        .fails_with(1)
        .stderr_has("No video file found");
}

#[test]
fn upload_to_prints_image_urls() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    let output = project
        .relprep_with_media_tools(100.0)
        .args(&["screenshots", "foo.mkv", "--number", "1", "--upload-to", "dummy"])
        .passes()
        .stdout_has("http://localhost/foo.mkv.0:00:50.png");

    assert_eq!(output.stdout_lines().len(), 2);
}

#[test]
fn unknown_image_host_fails() {
    let project = Project::empty();
    project.file("foo.mkv", "video data");

    project
        .relprep_with_media_tools(100.0)
        .args(&["screenshots", "foo.mkv", "--upload-to", "nope"])
        .fails_with(1)
        .stderr_has("Unknown image host: nope");
}
