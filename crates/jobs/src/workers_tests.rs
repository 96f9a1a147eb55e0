// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{fake_media_tools, video_file, EnvGuard};
use parking_lot::Mutex;
use relprep_adapters::test_support::flaky_ffmpeg;
use relprep_daemon::{DaemonError, DaemonProcess, Spawn};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

type Log = Arc<Mutex<Vec<String>>>;

fn recording(target: &'static str, args: Value) -> (DaemonProcess, Log) {
    let worker = registry().get(target).unwrap();
    let log: Log = Arc::default();
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    let process = DaemonProcess::new(target, worker, args)
        .spawn(Spawn::Thread)
        .on_init(move |v| a.lock().push(format!("init:{v}")))
        .on_info(move |v| b.lock().push(format!("info:{v}")))
        .on_error(move |e| c.lock().push(format!("error:{e}")))
        .on_finished(move |r| d.lock().push(format!("finished:{r:?}")));
    (process, log)
}

async fn run(target: &'static str, args: Value) -> Vec<String> {
    let (process, log) = recording(target, args);
    process.start().unwrap();
    process.join().await.unwrap();
    let log = log.lock().clone();
    log
}

fn torrent_args(content: &Path, torrent: &Path, announce: &str) -> Value {
    serde_json::to_value(CreateOptions {
        content_path: content.to_path_buf(),
        torrent_path: torrent.to_path_buf(),
        overwrite: false,
        announce: announce.to_string(),
        source: None,
        exclude: Vec::new(),
    })
    .unwrap()
}

fn screenshots_args(content: &Path, output_dir: &Path, timestamps: &[&str], number: usize) -> Value {
    serde_json::to_value(ScreenshotsArgs {
        content_path: content.to_path_buf(),
        timestamps: timestamps.iter().map(|s| s.to_string()).collect(),
        number,
        output_dir: output_dir.to_path_buf(),
        overwrite: false,
    })
    .unwrap()
}

#[test]
fn registry_knows_every_worker() {
    let targets: Vec<_> = registry().targets().collect();
    assert_eq!(targets, vec![CREATE_TORRENT, SCREENSHOTS]);
}

#[tokio::test]
async fn create_torrent_reports_tree_progress_and_path() {
    let tmp = tempfile::tempdir().unwrap();
    let content = tmp.path().join("a.mkv");
    std::fs::write(&content, b"data").unwrap();
    let torrent = tmp.path().join("a.torrent");

    let log = run(CREATE_TORRENT, torrent_args(&content, &torrent, "https://t.example/a")).await;

    assert_eq!(
        log,
        vec![
            r#"init:[{"name":"a.mkv","size":4}]"#.to_string(),
            "info:100.0".to_string(),
            format!("finished:Some(String({:?}))", torrent.display().to_string()),
        ]
    );
    assert!(torrent.exists());
}

#[tokio::test]
async fn create_torrent_reports_domain_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let content = tmp.path().join("a.mkv");
    std::fs::write(&content, b"data").unwrap();

    let log = run(CREATE_TORRENT, torrent_args(&content, &tmp.path().join("a.torrent"), "")).await;

    assert_eq!(log, vec!["error:Announce URL is empty", "finished:None"]);
}

#[tokio::test]
async fn create_torrent_with_bad_arguments_crashes() {
    let (process, log) = recording(CREATE_TORRENT, json!({"content_path": 1}));

    process.start().unwrap();
    let err = process.join().await.unwrap_err();

    assert!(matches!(err, DaemonError::WorkerCrashed { .. }));
    assert_eq!(*log.lock(), vec!["finished:None"]);
}

#[tokio::test]
#[serial]
async fn screenshots_reports_every_step() {
    let tmp = tempfile::tempdir().unwrap();
    let _tools = fake_media_tools(tmp.path(), 100.0);
    let video = video_file(tmp.path(), "content/movie.mkv");
    let out = tmp.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let log = run(SCREENSHOTS, screenshots_args(&video, &out, &[], 0)).await;

    let shot1 = out.join("movie.mkv.0:00:50.png");
    let shot2 = out.join("movie.mkv.0:01:15.png");
    let info = |i: ScreenshotsInfo| format!("info:{}", serde_json::to_value(i).unwrap());
    assert_eq!(
        log,
        vec![
            info(ScreenshotsInfo::VideoFile(video.clone())),
            info(ScreenshotsInfo::Timestamps(vec!["0:00:50".into(), "0:01:15".into()])),
            info(ScreenshotsInfo::Screenshot(shot1.clone())),
            info(ScreenshotsInfo::Screenshot(shot2.clone())),
            "finished:None".to_string(),
        ]
    );
    assert!(shot1.exists());
    assert!(shot2.exists());
}

#[tokio::test]
#[serial]
async fn screenshots_continue_after_failed_screenshot() {
    let tmp = tempfile::tempdir().unwrap();
    let _tools = fake_media_tools(tmp.path(), 100.0);
    let _ffmpeg = EnvGuard::set("RELPREP_FFMPEG", &flaky_ffmpeg(tmp.path(), "0:00:10"));
    let video = video_file(tmp.path(), "movie.mkv");

    let log = run(SCREENSHOTS, screenshots_args(&video, tmp.path(), &["0:10", "0:20"], 0)).await;

    let errors: Vec<_> = log.iter().filter(|l| l.starts_with("error:")).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with(&format!("error:{}: Failed to create screenshot at 0:00:10", video.display())));
    assert!(tmp.path().join("movie.mkv.0:00:20.png").exists());
    assert_eq!(log.last().map(String::as_str), Some("finished:None"));
}

#[tokio::test]
#[serial]
async fn screenshot_at_video_end_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let _tools = fake_media_tools(tmp.path(), 100.0);
    let video = video_file(tmp.path(), "movie.mkv");

    let log = run(SCREENSHOTS, screenshots_args(&video, tmp.path(), &["5:00"], 0)).await;

    assert!(log.contains(&"error:Timestamp is after video end (0:01:40): 0:01:40".to_string()));
}

#[tokio::test]
#[serial]
async fn screenshots_without_video() {
    let tmp = tempfile::tempdir().unwrap();
    let _tools = fake_media_tools(tmp.path(), 100.0);
    let content = tmp.path().join("empty");
    std::fs::create_dir(&content).unwrap();

    let log = run(SCREENSHOTS, screenshots_args(&content, tmp.path(), &[], 0)).await;

    assert_eq!(log, vec![format!("error:{}: No video file found", content.display()), "finished:None".to_string()]);
}
