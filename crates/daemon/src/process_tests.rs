// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{Inbox, Outbox, WorkerError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

type Log = Arc<Mutex<Vec<String>>>;

fn recording(worker: WorkerFn, args: Value) -> (DaemonProcess, Log) {
    let log: Log = Arc::default();
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    let process = DaemonProcess::new("test", worker, args)
        .spawn(Spawn::Thread)
        .on_init(move |v| a.lock().push(format!("init:{v}")))
        .on_info(move |v| b.lock().push(format!("info:{v}")))
        .on_error(move |e| c.lock().push(format!("error:{e}")))
        .on_finished(move |r| d.lock().push(format!("finished:{r:?}")));
    (process, log)
}

fn chatty(outbox: &Outbox, _: &Inbox, args: Value) -> Result<(), WorkerError> {
    outbox.init(json!({"files": 2}))?;
    outbox.info(50)?;
    outbox.error("bad file")?;
    outbox.info(100)?;
    outbox.result(Some(args))
}

fn silent(_: &Outbox, _: &Inbox, _: Value) -> Result<(), WorkerError> {
    Ok(())
}

fn failing(outbox: &Outbox, _: &Inbox, _: Value) -> Result<(), WorkerError> {
    outbox.info(1)?;
    Err(WorkerError::Failed("out of cheese".into()))
}

fn panicking(_: &Outbox, _: &Inbox, _: Value) -> Result<(), WorkerError> {
    panic!("worker exploded")
}

fn looping(outbox: &Outbox, inbox: &Inbox, _: Value) -> Result<(), WorkerError> {
    outbox.init("ready")?;
    while !inbox.shall_terminate() {
        if let Some(data) = inbox.custom() {
            outbox.info(data)?;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    outbox.result(Some(json!("stopped")))
}

#[tokio::test]
async fn dispatches_messages_in_order() {
    let (process, log) = recording(chatty, json!("path/to/result"));

    process.start().unwrap();
    process.join().await.unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            r#"init:{"files":2}"#,
            "info:50",
            "error:bad file",
            "info:100",
            r#"finished:Some(String("path/to/result"))"#,
        ]
    );
}

#[tokio::test]
async fn exit_without_result_finishes_with_none() {
    let (process, log) = recording(silent, Value::Null);

    process.start().unwrap();
    process.join().await.unwrap();

    assert_eq!(*log.lock(), vec!["finished:None"]);
}

#[tokio::test]
async fn returned_error_is_a_crash() {
    let (process, log) = recording(failing, Value::Null);

    process.start().unwrap();
    let err = process.join().await.unwrap_err();

    assert_eq!(
        err,
        DaemonError::WorkerCrashed { target: "test".into(), message: "out of cheese".into() }
    );
    assert_eq!(*log.lock(), vec!["info:1", "finished:None"]);
}

#[tokio::test]
async fn panic_is_a_crash() {
    let (process, log) = recording(panicking, Value::Null);

    process.start().unwrap();
    let err = process.join().await.unwrap_err();

    assert!(matches!(err, DaemonError::WorkerCrashed { ref message, .. } if message == "worker exploded"));
    assert_eq!(*log.lock(), vec!["finished:None"]);
}

#[tokio::test]
async fn join_before_start_is_a_noop() {
    let (process, log) = recording(chatty, Value::Null);

    process.join().await.unwrap();

    assert!(!process.is_started());
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn join_repeatedly_and_concurrently() {
    let (process, _) = recording(failing, Value::Null);
    let process = Arc::new(process);
    process.start().unwrap();

    let a = tokio::spawn({
        let process = Arc::clone(&process);
        async move { process.join().await }
    });
    let b = tokio::spawn({
        let process = Arc::clone(&process);
        async move { process.join().await }
    });

    let first = a.await.unwrap().unwrap_err();
    let second = b.await.unwrap().unwrap_err();
    let third = process.join().await.unwrap_err();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[tokio::test]
async fn stop_terminates_cooperative_worker() {
    let ready = Arc::new(Notify::new());
    let log: Log = Arc::default();
    let (r, l) = (Arc::clone(&ready), Arc::clone(&log));
    let process = DaemonProcess::new("loop", looping, Value::Null)
        .spawn(Spawn::Thread)
        .on_init(move |_| r.notify_one())
        .on_finished(move |v| l.lock().push(format!("{v:?}")));

    process.start().unwrap();
    ready.notified().await;
    process.stop();
    tokio::time::timeout(Duration::from_secs(5), process.join()).await.unwrap().unwrap();

    assert_eq!(*log.lock(), vec![r#"Some(String("stopped"))"#]);
}

#[tokio::test]
async fn custom_commands_reach_the_worker() {
    let ready = Arc::new(Notify::new());
    let got = Arc::new(Notify::new());
    let log: Log = Arc::default();
    let (r, g, l) = (Arc::clone(&ready), Arc::clone(&got), Arc::clone(&log));
    let process = DaemonProcess::new("loop", looping, Value::Null)
        .spawn(Spawn::Thread)
        .on_init(move |_| r.notify_one())
        .on_info(move |v| {
            l.lock().push(v.to_string());
            g.notify_one();
        });

    process.start().unwrap();
    ready.notified().await;
    process.send(json!("ping"));
    got.notified().await;
    process.stop();
    process.join().await.unwrap();

    assert_eq!(*log.lock(), vec![r#""ping""#]);
}

static STARTS: AtomicUsize = AtomicUsize::new(0);

fn counting(_: &Outbox, _: &Inbox, _: Value) -> Result<(), WorkerError> {
    STARTS.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

#[tokio::test]
async fn start_twice_runs_one_worker() {
    let process = DaemonProcess::new("count", counting, Value::Null).spawn(Spawn::Thread);

    process.start().unwrap();
    process.start().unwrap();
    process.join().await.unwrap();

    assert_eq!(STARTS.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_before_start_is_a_noop() {
    let (process, log) = recording(chatty, Value::Null);
    process.stop();
    process.join().await.unwrap();
    assert!(log.lock().is_empty());
}
