//! `relprep mediainfo` specs

use crate::prelude::*;

#[test]
fn prints_report_of_first_video() {
    let project = Project::empty();
    project.file("Foo/foo.mkv", "video data");

    project
        .relprep_with_media_tools(100.0)
        .args(&["mediainfo", "Foo"])
        .passes()
        .stdout_has("General")
        .stdout_has("Complete name : Foo/foo.mkv");
}

#[test]
fn missing_content_fails() {
    let project = Project::empty();

    project
        .relprep_with_media_tools(100.0)
        .args(&["mediainfo", "nope"])
        .fails_with(1)
        .stderr_has("nope: No such file or directory");
}
