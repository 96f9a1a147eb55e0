//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("create-torrent")
        .stdout_has("add-torrent")
        .stdout_has("screenshots")
        .stdout_has("mediainfo")
        .stdout_has("upload-images")
        .stdout_lacks("worker");
}

#[test]
fn create_torrent_help_shows_options() {
    cli()
        .args(&["create-torrent", "--help"])
        .passes()
        .stdout_has("--tracker")
        .stdout_has("--add-to")
        .stdout_has("--copy-to")
        .stdout_has("--ignore-cache");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn no_args_shows_usage_and_fails() {
    cli().fails_with(2).stderr_has("Usage:");
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["upload"]).fails_with(2).stderr_has("upload");
}

#[test]
fn worker_with_unknown_target_fails() {
    cli().args(&["worker", "nope"]).fails_with(1).stderr_has("nope");
}
