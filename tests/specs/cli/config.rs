//! Config file specs

use crate::prelude::*;

#[test]
fn unknown_tracker_fails_before_running_jobs() {
    let project = Project::empty();
    project.file("foo.mkv", "data");

    project
        .relprep()
        .args(&["create-torrent", "foo.mkv", "--tracker", "nope"])
        .fails_with(1)
        .stderr_has("Unknown tracker: nope");
}

#[test]
fn unknown_client_fails() {
    let project = Project::empty();
    let torrent = project.file("a.torrent", "d4:infodee");

    project
        .relprep()
        .args(&["add-torrent", "nope", torrent.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("Unknown client: nope");
}

#[test]
fn missing_explicit_config_fails() {
    let project = Project::empty();

    project
        .relprep()
        .args(&["--config", "missing.toml", "mediainfo", "foo.mkv"])
        .fails_with(1)
        .stderr_has("missing.toml");
}

#[test]
fn invalid_config_fails() {
    let project = Project::empty();
    project.config("[trackers\n");

    project.relprep().args(&["mediainfo", "foo.mkv"]).fails_with(1).stderr_has("config.toml");
}

#[test]
fn unknown_config_key_fails() {
    let project = Project::empty();
    project.config("[trackers.nbl]\nannounce_url = \"https://nbl.example/announce\"\n");

    project.relprep().args(&["mediainfo", "foo.mkv"]).fails_with(1).stderr_has("announce_url");
}
