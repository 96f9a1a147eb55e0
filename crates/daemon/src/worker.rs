// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker side of a daemon process.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use parking_lot::Mutex;
use relprep_wire::{read_frame_sync, write_frame_sync, ProtocolError, WorkerCommand, WorkerMessage};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::{DaemonError, WorkerError, WorkerRegistry};

/// Entry point of a worker. Runs on its own thread or process and may block.
///
/// Recoverable problems are reported with [`Outbox::error`]. Returning `Err`
/// or panicking ends the worker as crashed.
pub type WorkerFn = fn(&Outbox, &Inbox, Value) -> Result<(), WorkerError>;

enum Sink {
    Channel(UnboundedSender<WorkerMessage>),
    Stream(Mutex<Box<dyn Write + Send>>),
}

/// Messages from the worker to its owner.
pub struct Outbox {
    sink: Sink,
}

impl Outbox {
    pub(crate) fn channel(tx: UnboundedSender<WorkerMessage>) -> Self {
        Self { sink: Sink::Channel(tx) }
    }

    pub(crate) fn stream(writer: impl Write + Send + 'static) -> Self {
        Self { sink: Sink::Stream(Mutex::new(Box::new(writer))) }
    }

    fn send(&self, message: WorkerMessage) -> Result<(), WorkerError> {
        match &self.sink {
            Sink::Channel(tx) => tx.send(message).map_err(|_| WorkerError::Disconnected),
            Sink::Stream(writer) => {
                let mut writer = writer.lock();
                write_frame_sync(&mut *writer, &message).map_err(|e| match e {
                    ProtocolError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        WorkerError::Disconnected
                    }
                    e => WorkerError::Protocol(e),
                })
            }
        }
    }

    /// Preparation is done; `data` describes the work ahead.
    pub fn init(&self, data: impl Serialize) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Init { data: serde_json::to_value(data)? })
    }

    /// Progress or an intermediate result.
    pub fn info(&self, data: impl Serialize) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Info { data: serde_json::to_value(data)? })
    }

    /// Recoverable error. The worker should carry on with the next item.
    pub fn error(&self, message: impl fmt::Display) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Error { message: message.to_string() })
    }

    /// Final result. Nothing sent after this is delivered.
    pub fn result(&self, data: Option<Value>) -> Result<(), WorkerError> {
        self.send(WorkerMessage::Result { data })
    }

    fn crashed(&self, message: String) {
        if self.send(WorkerMessage::Crashed { message }).is_err() {
            tracing::debug!("owner gone, crash not delivered");
        }
    }
}

/// Commands from the owner to the worker.
pub struct Inbox {
    rx: Receiver<WorkerCommand>,
    terminated: Cell<bool>,
    custom: RefCell<VecDeque<Value>>,
}

impl Inbox {
    pub(crate) fn new(rx: Receiver<WorkerCommand>) -> Self {
        Self { rx, terminated: Cell::new(false), custom: RefCell::new(VecDeque::new()) }
    }

    fn drain(&self) {
        loop {
            match self.rx.try_recv() {
                Ok(WorkerCommand::Terminate) => self.terminated.set(true),
                Ok(WorkerCommand::Custom { data }) => self.custom.borrow_mut().push_back(data),
                Ok(WorkerCommand::Start { .. }) => {
                    tracing::debug!("ignoring repeated start command");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.terminated.set(true);
                    break;
                }
            }
        }
    }

    /// Whether the owner asked the worker to stop. Never blocks.
    ///
    /// A closed command channel counts as a stop request.
    pub fn shall_terminate(&self) -> bool {
        self.drain();
        self.terminated.get()
    }

    /// Next worker-specific command, if one arrived. Never blocks.
    pub fn custom(&self) -> Option<Value> {
        self.drain();
        self.custom.borrow_mut().pop_front()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Run `worker`, turning an error or a panic into a `Crashed` message.
///
/// Returns the crash message, if any.
pub(crate) fn run_guarded(
    worker: WorkerFn,
    outbox: &Outbox,
    inbox: &Inbox,
    args: Value,
) -> Option<String> {
    let message = match panic::catch_unwind(AssertUnwindSafe(|| worker(outbox, inbox, args))) {
        Ok(Ok(())) => return None,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    tracing::warn!(error = %message, "worker crashed");
    outbox.crashed(message.clone());
    Some(message)
}

/// Serve `target` over stdin/stdout. Used by the hidden `worker` subcommand.
///
/// The first frame on stdin must be `Start`; later frames are delivered
/// through [`Inbox`]. Frames for the owner go to stdout, so nothing else may
/// write there.
pub fn serve_stdio(registry: &WorkerRegistry, target: &str) -> Result<(), DaemonError> {
    let worker =
        registry.get(target).ok_or_else(|| DaemonError::UnknownTarget(target.to_string()))?;

    let mut stdin = std::io::stdin();
    let args = match read_frame_sync(&mut stdin)? {
        WorkerCommand::Start { args } => args,
        other => {
            return Err(DaemonError::Protocol(format!("expected start command, got {other:?}")));
        }
    };
    tracing::debug!(worker = target, "worker started");

    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("worker-stdin".to_string())
        .spawn(move || {
            let mut stdin = std::io::stdin();
            while let Ok(command) = read_frame_sync::<WorkerCommand, _>(&mut stdin) {
                if tx.send(command).is_err() {
                    break;
                }
            }
        })
        .map_err(|e| DaemonError::Spawn { target: target.to_string(), message: e.to_string() })?;

    let outbox = Outbox::stream(std::io::stdout());
    let inbox = Inbox::new(rx);
    match run_guarded(worker, &outbox, &inbox, args) {
        None => Ok(()),
        Some(message) => Err(DaemonError::WorkerCrashed { target: target.to_string(), message }),
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
