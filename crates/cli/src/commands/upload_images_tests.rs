// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    args: UploadImagesArgs,
}

#[test]
fn parses_host_and_images() {
    let cli = Cli::try_parse_from(["x", "ptpimg", "a.png", "b.png"]).unwrap();

    assert_eq!(cli.args.host, "ptpimg");
    assert_eq!(cli.args.images, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
}

#[test]
fn images_are_required() {
    assert!(Cli::try_parse_from(["x", "ptpimg"]).is_err());
}

#[test]
fn unknown_host_fails_before_any_job_exists() {
    let ctx = Context { config: crate::config::Config::builtin(), ignore_cache: false };
    let args = UploadImagesArgs { host: "nope".into(), images: vec![PathBuf::from("a.png")] };

    let err = jobs(args, &ctx).err().unwrap();

    assert_eq!(err.to_string(), "Unknown image host: nope");
}
