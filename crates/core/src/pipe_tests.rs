// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::FakeKind;
use crate::JobConfig;

fn new_job(homedir: &std::path::Path, kind: FakeKind) -> (Job, Arc<FakeKind>) {
    let kind = Arc::new(kind);
    let job = Job::new(JobConfig::new(homedir), Arc::clone(&kind));
    (job, kind)
}

#[tokio::test]
async fn forwards_output_then_closes_once() {
    let tmp = tempfile::tempdir().unwrap();
    let (sender, _) = new_job(tmp.path(), FakeKind::new("sender").uncached());
    let (receiver, receiver_kind) = new_job(tmp.path(), FakeKind::new("receiver").uncached().pipeable());
    let pipe = Pipe::connect(&sender, &receiver);

    sender.start();
    sender.send("x").unwrap();
    sender.send("y").unwrap();
    sender.finish();
    sender.finish();

    assert!(pipe.is_closed());
    assert_eq!(
        receiver_kind.calls(),
        vec!["pipe_input:x", "pipe_input:y", "pipe_closed", "finishing"]
    );
    assert_eq!(receiver.output(), vec!["x", "y"]);
    receiver.wait().await.unwrap();
}

#[tokio::test]
async fn forwards_replayed_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let (first, _) = new_job(tmp.path(), FakeKind::new("sender").sends(&["a", "b"]));
    first.start();
    first.wait().await.unwrap();

    let (sender, sender_kind) = new_job(tmp.path(), FakeKind::new("sender").sends(&["c"]));
    let (receiver, receiver_kind) = new_job(tmp.path(), FakeKind::new("receiver").uncached().pipeable());
    Pipe::connect(&sender, &receiver);

    sender.start();

    assert!(sender_kind.calls().is_empty());
    assert_eq!(
        receiver_kind.calls(),
        vec!["pipe_input:a", "pipe_input:b", "pipe_closed", "finishing"]
    );
}

#[tokio::test]
async fn unsupported_receiver_is_aborted() {
    let tmp = tempfile::tempdir().unwrap();
    let (sender, _) = new_job(tmp.path(), FakeKind::new("sender").uncached());
    let (receiver, _) = new_job(tmp.path(), FakeKind::new("receiver").uncached());
    Pipe::connect(&sender, &receiver);

    sender.start();
    sender.send("x").unwrap();

    assert!(receiver.is_finished());
    let err = receiver.wait().await.unwrap_err();
    assert_eq!(err, JobError::PipeUnsupported { job: "receiver".into(), hook: "pipe_input" });
}

#[tokio::test]
async fn output_for_finished_receiver_is_dropped() {
    let tmp = tempfile::tempdir().unwrap();
    let (sender, _) = new_job(tmp.path(), FakeKind::new("sender").uncached());
    let (receiver, _) = new_job(tmp.path(), FakeKind::new("receiver").uncached().pipeable());
    Pipe::connect(&sender, &receiver);
    sender.start();
    sender.send("x").unwrap();
    receiver.finish();
    assert_eq!(receiver.exit_code(), Some(0));

    sender.send("y").unwrap();

    assert_eq!(receiver.output(), vec!["x"]);
    assert_eq!(receiver.exit_code(), Some(0));
    receiver.wait().await.unwrap();
}
