// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner side of a daemon process.
//!
//! ```text
//! start() ──► worker ──Init/Info/Error──► callbacks
//!                    ──Result──────────► on_finished(Some) ─► join() Ok
//!                    ──Crashed / bad exit► on_finished(None) ─► join() Err
//! ```

use std::process::Stdio;
use std::sync::Arc;

use parking_lot::Mutex;
use relprep_wire::{read_frame, write_frame, ProtocolError, WorkerCommand, WorkerMessage};
use serde_json::Value;
use tokio::process::{Child, ChildStdout};
use tokio::sync::{mpsc, watch};

use crate::worker::{run_guarded, Inbox, Outbox};
use crate::{DaemonError, WorkerFn};

/// Where the worker runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Spawn {
    /// Re-run the current executable as `<exe> worker <target>`
    #[default]
    Process,
    /// Dedicated OS thread in this process
    Thread,
}

type ValueCallback = Arc<dyn Fn(Value) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;
type FinishedCallback = Arc<dyn Fn(Option<Value>) + Send + Sync>;

#[derive(Clone, Default)]
struct Callbacks {
    init: Option<ValueCallback>,
    info: Option<ValueCallback>,
    error: Option<ErrorCallback>,
    finished: Option<FinishedCallback>,
}

enum CommandSender {
    Thread(std::sync::mpsc::Sender<WorkerCommand>),
    Process(mpsc::UnboundedSender<WorkerCommand>),
}

impl CommandSender {
    fn send(&self, command: WorkerCommand) -> bool {
        match self {
            CommandSender::Thread(tx) => tx.send(command).is_ok(),
            CommandSender::Process(tx) => tx.send(command).is_ok(),
        }
    }
}

enum MessageSource {
    Thread(mpsc::UnboundedReceiver<WorkerMessage>),
    Process { stdout: ChildStdout, child: Child },
}

impl MessageSource {
    /// Next message, or `None` once the worker closed its end.
    async fn recv(&mut self) -> Result<Option<WorkerMessage>, ProtocolError> {
        match self {
            MessageSource::Thread(rx) => Ok(rx.recv().await),
            MessageSource::Process { stdout, .. } => match read_frame(stdout).await {
                Ok(message) => Ok(Some(message)),
                Err(ProtocolError::ConnectionClosed) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    /// Wait for the worker to exit. Returns a description of an abnormal exit.
    async fn exit(self) -> Option<String> {
        match self {
            MessageSource::Thread(_) => None,
            MessageSource::Process { stdout, mut child } => {
                drop(stdout);
                match child.wait().await {
                    Ok(status) if status.success() => None,
                    Ok(status) => Some(format!("worker exited with {status}")),
                    Err(e) => Some(format!("failed to wait for worker: {e}")),
                }
            }
        }
    }
}

type Outcome = Option<Result<(), DaemonError>>;

/// One background worker bound to one job.
pub struct DaemonProcess {
    target: &'static str,
    worker: WorkerFn,
    args: Value,
    spawn: Spawn,
    callbacks: Callbacks,
    commands: Mutex<Option<CommandSender>>,
    started: Mutex<bool>,
    outcome: Arc<watch::Sender<Outcome>>,
}

impl DaemonProcess {
    pub fn new(target: &'static str, worker: WorkerFn, args: Value) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            target,
            worker,
            args,
            spawn: Spawn::default(),
            callbacks: Callbacks::default(),
            commands: Mutex::new(None),
            started: Mutex::new(false),
            outcome: Arc::new(outcome),
        }
    }

    pub fn spawn(mut self, spawn: Spawn) -> Self {
        self.spawn = spawn;
        self
    }

    /// Called with the data of an `Init` message.
    pub fn on_init(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.callbacks.init = Some(Arc::new(f));
        self
    }

    /// Called with the data of every `Info` message.
    pub fn on_info(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.callbacks.info = Some(Arc::new(f));
        self
    }

    /// Called with every recoverable worker error.
    pub fn on_error(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.callbacks.error = Some(Arc::new(f));
        self
    }

    /// Called exactly once when the worker is done, with its result if it
    /// sent one.
    pub fn on_finished(mut self, f: impl Fn(Option<Value>) + Send + Sync + 'static) -> Self {
        self.callbacks.finished = Some(Arc::new(f));
        self
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn is_started(&self) -> bool {
        *self.started.lock()
    }

    /// Start the worker. Must be called inside a tokio runtime.
    ///
    /// Starting twice is a no-op.
    pub fn start(&self) -> Result<(), DaemonError> {
        let mut started = self.started.lock();
        if *started {
            return Ok(());
        }
        let (commands, source) = match self.spawn {
            Spawn::Thread => self.spawn_thread()?,
            Spawn::Process => self.spawn_process()?,
        };
        *self.commands.lock() = Some(commands);
        *started = true;
        drop(started);

        tracing::debug!(worker = self.target, spawn = ?self.spawn, "worker started");
        let target = self.target;
        let callbacks = self.callbacks.clone();
        let outcome = Arc::clone(&self.outcome);
        tokio::spawn(async move {
            let result = read_messages(target, source, callbacks).await;
            outcome.send_replace(Some(result));
        });
        Ok(())
    }

    fn spawn_thread(&self) -> Result<(CommandSender, MessageSource), DaemonError> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel();
        let worker = self.worker;
        let args = self.args.clone();
        std::thread::Builder::new()
            .name(format!("worker-{}", self.target))
            .spawn(move || {
                let outbox = Outbox::channel(msg_tx);
                let inbox = Inbox::new(cmd_rx);
                run_guarded(worker, &outbox, &inbox, args);
            })
            .map_err(|e| self.spawn_error(e))?;
        Ok((CommandSender::Thread(cmd_tx), MessageSource::Thread(msg_rx)))
    }

    fn spawn_process(&self) -> Result<(CommandSender, MessageSource), DaemonError> {
        let exe = crate::env::worker_exe()?;
        let mut child = tokio::process::Command::new(&exe)
            .arg("worker")
            .arg(self.target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(self.spawn_error("worker stdio not captured"));
        };
        tracing::debug!(worker = self.target, exe = %exe.display(), pid = ?child.id(), "spawned worker process");

        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<WorkerCommand>();
        let target = self.target;
        tokio::spawn(async move {
            while let Some(command) = cmd_rx.recv().await {
                if let Err(e) = write_frame(&mut stdin, &command).await {
                    tracing::debug!(worker = target, error = %e, "worker stdin closed");
                    break;
                }
            }
        });
        // Queued before anything else can be sent
        let _ = cmd_tx.send(WorkerCommand::Start { args: self.args.clone() });
        Ok((CommandSender::Process(cmd_tx), MessageSource::Process { stdout, child }))
    }

    fn spawn_error(&self, e: impl std::fmt::Display) -> DaemonError {
        DaemonError::Spawn { target: self.target.to_string(), message: e.to_string() }
    }

    /// Ask the worker to terminate. Cooperative; the worker decides when.
    pub fn stop(&self) {
        if let Some(commands) = self.commands.lock().as_ref() {
            if commands.send(WorkerCommand::Terminate) {
                tracing::debug!(worker = self.target, "sent terminate");
            }
        }
    }

    /// Send a worker-specific command.
    pub fn send(&self, data: Value) {
        if let Some(commands) = self.commands.lock().as_ref() {
            commands.send(WorkerCommand::Custom { data });
        }
    }

    /// Wait until the worker is gone and all its messages are dispatched.
    ///
    /// Returns [`DaemonError::WorkerCrashed`] if the worker crashed. Safe to
    /// call repeatedly and concurrently; a no-op if never started.
    pub async fn join(&self) -> Result<(), DaemonError> {
        if !self.is_started() {
            return Ok(());
        }
        let mut rx = self.outcome.subscribe();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        self.commands.lock().take();
        outcome.unwrap_or(Ok(()))
    }
}

async fn read_messages(
    target: &'static str,
    mut source: MessageSource,
    callbacks: Callbacks,
) -> Result<(), DaemonError> {
    let mut result = None;
    let mut crash = None;
    loop {
        match source.recv().await {
            Ok(Some(WorkerMessage::Init { data })) => {
                if let Some(f) = &callbacks.init {
                    f(data);
                }
            }
            Ok(Some(WorkerMessage::Info { data })) => {
                if let Some(f) = &callbacks.info {
                    f(data);
                }
            }
            Ok(Some(WorkerMessage::Error { message })) => {
                if let Some(f) = &callbacks.error {
                    f(message);
                }
            }
            Ok(Some(WorkerMessage::Result { data })) => {
                result = Some(data);
                break;
            }
            Ok(Some(WorkerMessage::Crashed { message })) => {
                crash = Some(message);
                break;
            }
            Ok(None) => break,
            Err(e) => {
                crash = Some(format!("invalid message: {e}"));
                break;
            }
        }
    }

    let got_result = result.is_some();
    if let Some(f) = &callbacks.finished {
        f(result.flatten());
    }

    if let Some(status) = source.exit().await {
        if crash.is_none() && !got_result {
            crash = Some(status);
        }
    }
    match crash {
        Some(message) => {
            tracing::warn!(worker = target, error = %message, "worker crashed");
            Err(DaemonError::WorkerCrashed { target: target.to_string(), message })
        }
        None => {
            tracing::debug!(worker = target, "worker finished");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
