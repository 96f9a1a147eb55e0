//! `relprep add-torrent` specs

use crate::prelude::*;

#[test]
fn adds_torrents_to_dummy_client() {
    let project = Project::empty();
    let a = project.file("a.torrent", "d4:infodee");
    let b = project.file("b.torrent", "d4:infodee");

    let output = project
        .relprep()
        .args(&["add-torrent", "dummy", a.to_str().unwrap(), b.to_str().unwrap()])
        .passes();

    assert_eq!(output.stdout_lines(), vec!["123", "123"]);
}

#[test]
fn oversized_torrent_fails() {
    let project = Project::empty();
    let big = project.file("big.torrent", vec![b'x'; 10 * 1024 * 1024 + 1]);

    project
        .relprep()
        .args(&["add-torrent", "dummy", big.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("big.torrent: File is too large");
}

#[test]
fn needs_at_least_one_torrent() {
    Project::empty().relprep().args(&["add-torrent", "dummy"]).fails_with(2);
}
