// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machine.
//!
//! A [`Job`] is a handle around shared state: accumulated output and errors,
//! a fatal error slot, observer lists and a finished flag. The work itself is
//! done by a [`JobKind`] implementation.
//!
//! ```text
//! created ──start()──┬── cache hit ──────────────► finished
//!                    └── execute() ─► running ───► finished
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::{self, CacheArgs};
use crate::error::JobError;
use crate::observer::Observers;

/// Lifecycle phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    Finished,
}

crate::simple_display! {
    JobState {
        Created => "created",
        Running => "running",
        Finished => "finished",
    }
}

/// Settings shared by every job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Directory for files the job creates; cached output goes to `.output/`.
    pub homedir: PathBuf,
    /// Don't replay cached output or reuse previously created files.
    pub ignore_cache: bool,
    /// Hide this job's output in the UI.
    pub quiet: bool,
}

impl JobConfig {
    pub fn new(homedir: impl Into<PathBuf>) -> Self {
        Self { homedir: homedir.into(), ignore_cache: false, quiet: false }
    }

    crate::setters! {
        set { ignore_cache: bool, quiet: bool }
    }
}

/// Read-only view of a finished job, passed to [`JobKind::exit_code`].
#[derive(Debug)]
pub struct JobStatus<'a> {
    pub output: &'a [String],
    pub errors: &'a [String],
    pub failed: bool,
}

impl JobStatus<'_> {
    /// 0 with output and without errors, 1 otherwise.
    pub fn default_exit_code(&self) -> i32 {
        if self.output.is_empty() || !self.errors.is_empty() || self.failed {
            1
        } else {
            0
        }
    }
}

/// The work a [`Job`] performs.
///
/// Construction of the implementing type takes the job-specific parameters;
/// everything else goes through the hooks below, which receive the owning
/// job handle.
#[async_trait]
pub trait JobKind: Send + Sync + 'static {
    /// Internal name, used in the cache file name.
    fn name(&self) -> &str;

    /// User-facing name.
    fn label(&self) -> &str;

    /// Called once from [`Job::new`]. Must return quickly.
    ///
    /// Invalid input may be reported here with [`Job::error`] followed by
    /// [`Job::finish`], in which case [`JobKind::execute`] is never called.
    fn initialize(&self, _job: &Job) {}

    /// Start the actual work. Must not block.
    fn execute(&self, job: &Job);

    /// Output item from a piped sender.
    fn pipe_input(&self, _job: &Job, _value: &str) -> Result<(), JobError> {
        Err(JobError::PipeUnsupported { job: self.name().to_string(), hook: "pipe_input" })
    }

    /// The piped sender has finished.
    fn pipe_closed(&self, _job: &Job) -> Result<(), JobError> {
        Err(JobError::PipeUnsupported { job: self.name().to_string(), hook: "pipe_closed" })
    }

    /// Identifying arguments for the cache file name, or `None` to disable
    /// caching for this kind.
    fn cache_args(&self) -> Option<CacheArgs> {
        Some(CacheArgs::new())
    }

    /// Called by [`Job::finish`] before the job is marked finished.
    fn finishing(&self, _job: &Job) {}

    /// Awaited by [`Job::wait`] before it waits for the finished flag.
    async fn joined(&self, _job: &Job) -> Result<(), JobError> {
        Ok(())
    }

    /// Exit code of the finished job.
    ///
    /// Called with the job's state locked; must not call back into the job.
    fn exit_code(&self, status: &JobStatus<'_>) -> i32 {
        status.default_exit_code()
    }

    /// Extra UI-only information that isn't part of the output.
    fn info(&self) -> String {
        String::new()
    }
}

#[derive(Debug)]
struct State {
    phase: JobState,
    output: Vec<String>,
    errors: Vec<String>,
    fatal: Option<JobError>,
}

struct Inner {
    config: JobConfig,
    kind: Arc<dyn JobKind>,
    state: Mutex<State>,
    output_observers: Observers<str>,
    error_observers: Observers<str>,
    finished_observers: Observers<Job>,
    finished_tx: watch::Sender<bool>,
}

/// Cheaply clonable handle to one unit of work.
#[derive(Clone)]
pub struct Job {
    inner: Arc<Inner>,
}

/// Non-owning handle, for callbacks stored inside the job's own kind.
#[derive(Clone)]
pub struct WeakJob {
    inner: Weak<Inner>,
}

impl WeakJob {
    pub fn upgrade(&self) -> Option<Job> {
        self.inner.upgrade().map(|inner| Job { inner })
    }
}

impl Job {
    /// Wrap `kind` and run its [`JobKind::initialize`] hook.
    pub fn new<K: JobKind>(config: JobConfig, kind: Arc<K>) -> Job {
        let (finished_tx, _) = watch::channel(false);
        let job = Job {
            inner: Arc::new(Inner {
                config,
                kind,
                state: Mutex::new(State {
                    phase: JobState::Created,
                    output: Vec::new(),
                    errors: Vec::new(),
                    fatal: None,
                }),
                output_observers: Observers::new(),
                error_observers: Observers::new(),
                finished_observers: Observers::new(),
                finished_tx,
            }),
        };
        job.inner.kind.initialize(&job);
        job
    }

    pub fn downgrade(&self) -> WeakJob {
        WeakJob { inner: Arc::downgrade(&self.inner) }
    }

    pub fn name(&self) -> &str {
        self.inner.kind.name()
    }

    pub fn label(&self) -> &str {
        self.inner.kind.label()
    }

    pub fn homedir(&self) -> &Path {
        &self.inner.config.homedir
    }

    pub fn ignore_cache(&self) -> bool {
        self.inner.config.ignore_cache
    }

    pub fn quiet(&self) -> bool {
        self.inner.config.quiet
    }

    pub fn info(&self) -> String {
        self.inner.kind.info()
    }

    pub fn state(&self) -> JobState {
        self.inner.state.lock().phase
    }

    pub fn is_started(&self) -> bool {
        self.state() != JobState::Created
    }

    pub fn is_finished(&self) -> bool {
        self.state() == JobState::Finished
    }

    pub fn output(&self) -> Vec<String> {
        self.inner.state.lock().output.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.inner.state.lock().errors.clone()
    }

    /// The stored fatal error, if any.
    pub fn fatal_error(&self) -> Option<JobError> {
        self.inner.state.lock().fatal.clone()
    }

    /// `None` until finished, then 0 for success and 1 for failure.
    pub fn exit_code(&self) -> Option<i32> {
        let state = self.inner.state.lock();
        if state.phase != JobState::Finished {
            return None;
        }
        let status =
            JobStatus { output: &state.output, errors: &state.errors, failed: state.fatal.is_some() };
        Some(self.inner.kind.exit_code(&status))
    }

    /// Replay cached output if there is any, otherwise execute.
    pub fn start(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.phase != JobState::Created {
                tracing::debug!(job = self.name(), state = %state.phase, "not starting");
                return;
            }
            state.phase = JobState::Running;
        }

        match self.read_cache() {
            Ok(Some(output)) if !output.is_empty() => {
                tracing::debug!(job = self.name(), items = output.len(), "replaying cached output");
                self.replay(output);
            }
            Ok(_) => {
                tracing::debug!(job = self.name(), "executing");
                self.inner.kind.execute(self);
            }
            Err(e) => self.abort(e),
        }
    }

    fn replay(&self, output: Vec<String>) {
        {
            let mut state = self.inner.state.lock();
            state.output = output.clone();
            state.phase = JobState::Finished;
        }
        for item in &output {
            self.inner.output_observers.emit(item.as_str());
        }
        self.inner.finished_observers.emit(self);
        self.inner.finished_tx.send_replace(true);
    }

    /// Append `output` and notify output observers. Empty strings are ignored.
    pub fn send(&self, output: impl fmt::Display) -> Result<(), JobError> {
        let output = output.to_string();
        {
            let mut state = self.inner.state.lock();
            if state.phase == JobState::Finished {
                return Err(self.finished_error("send"));
            }
            if output.is_empty() {
                return Ok(());
            }
            state.output.push(output.clone());
        }
        self.inner.output_observers.emit(output.as_str());
        Ok(())
    }

    /// Like [`Job::send`], but silently ignored once the job is finished.
    pub fn send_if_not_finished(&self, output: impl fmt::Display) {
        if self.send(output).is_err() {
            tracing::debug!(job = self.name(), "ignoring output after finish");
        }
    }

    /// Append `error` and notify error observers.
    pub fn error(&self, error: impl fmt::Display) -> Result<(), JobError> {
        let error = error.to_string();
        {
            let mut state = self.inner.state.lock();
            if state.phase == JobState::Finished {
                return Err(self.finished_error("error"));
            }
            state.errors.push(error.clone());
        }
        tracing::debug!(job = self.name(), %error, "job error");
        self.inner.error_observers.emit(error.as_str());
        Ok(())
    }

    /// Like [`Job::error`], but silently ignored once the job is finished.
    pub fn error_if_not_finished(&self, error: impl fmt::Display) {
        if self.error(error).is_err() {
            tracing::debug!(job = self.name(), "ignoring error after finish");
        }
    }

    /// Store a fatal error to be returned from [`Job::wait`].
    ///
    /// Only one fatal error can be stored and only before the job finishes.
    pub fn fail(&self, error: JobError) -> Result<(), JobError> {
        let mut state = self.inner.state.lock();
        if state.phase == JobState::Finished {
            return Err(self.finished_error("fail"));
        }
        if state.fatal.is_some() {
            return Err(JobError::AlreadyFailed { job: self.name().to_string() });
        }
        tracing::debug!(job = self.name(), %error, "storing fatal error");
        state.fatal = Some(error);
        Ok(())
    }

    /// Store `error` unless a fatal error is already stored, then finish.
    ///
    /// This is the path for failures that threaten the job's own completion
    /// (corrupt cache, broken pipe, crashed worker) and may happen at any time.
    pub fn abort(&self, error: JobError) {
        self.record_fatal(error);
        self.finish();
    }

    fn record_fatal(&self, error: JobError) {
        let mut state = self.inner.state.lock();
        if state.fatal.is_none() {
            tracing::warn!(job = self.name(), %error, "fatal job error");
            state.fatal = Some(error);
        } else {
            tracing::debug!(job = self.name(), %error, "dropping secondary fatal error");
        }
    }

    /// Mark the job as finished. Calling this more than once has no effect.
    ///
    /// Finished observers fire in registration order, then successful output
    /// is written to the cache, then [`Job::wait`] is unblocked.
    pub fn finish(&self) {
        if self.is_finished() {
            return;
        }
        self.inner.kind.finishing(self);
        {
            let mut state = self.inner.state.lock();
            if state.phase == JobState::Finished {
                return;
            }
            state.phase = JobState::Finished;
        }
        tracing::debug!(job = self.name(), exit_code = ?self.exit_code(), "finished");
        self.inner.finished_observers.emit(self);
        if let Err(e) = self.write_cache() {
            self.record_fatal(e);
        }
        self.inner.finished_tx.send_replace(true);
    }

    /// Wait until the job is finished.
    ///
    /// Safe to call repeatedly and concurrently. Every call returns the stored
    /// fatal error, if there is one.
    pub async fn wait(&self) -> Result<(), JobError> {
        if let Err(e) = self.inner.kind.joined(self).await {
            self.abort(e);
        }
        let mut rx = self.inner.finished_tx.subscribe();
        // The sender lives as long as `self`, so this can't fail.
        let _ = rx.wait_for(|finished| *finished).await;
        match self.fatal_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Call `callback` with every output item, including replayed cache items.
    pub fn on_output(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.inner.output_observers.register(callback);
    }

    /// Call `callback` with every reported error.
    pub fn on_error(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.inner.error_observers.register(callback);
    }

    /// Call `callback` when the job finishes, including after cache replay.
    pub fn on_finished(&self, callback: impl Fn(&Job) + Send + Sync + 'static) {
        self.inner.finished_observers.register(callback);
    }

    /// Forward an item from a piped sender to the kind.
    pub fn pipe_input(&self, value: &str) -> Result<(), JobError> {
        self.inner.kind.pipe_input(self, value)
    }

    /// Tell the kind that the piped sender has finished.
    pub fn pipe_closed(&self) -> Result<(), JobError> {
        self.inner.kind.pipe_closed(self)
    }

    /// Path of the cache file, or `None` if the kind disables caching.
    pub fn cache_file(&self) -> Result<Option<PathBuf>, JobError> {
        match self.inner.kind.cache_args() {
            Some(args) => cache::cache_file(self.homedir(), self.name(), &args).map(Some),
            None => Ok(None),
        }
    }

    fn read_cache(&self) -> Result<Option<Vec<String>>, JobError> {
        if self.ignore_cache() {
            return Ok(None);
        }
        match self.cache_file()? {
            Some(path) => {
                let output = cache::read(&path)?;
                if output.is_some() {
                    tracing::debug!(job = self.name(), path = %path.display(), "read output cache");
                }
                Ok(output)
            }
            None => Ok(None),
        }
    }

    fn write_cache(&self) -> Result<(), JobError> {
        if self.exit_code() != Some(0) {
            return Ok(());
        }
        let output = self.output();
        if output.is_empty() {
            return Ok(());
        }
        if let Some(path) = self.cache_file()? {
            tracing::debug!(job = self.name(), path = %path.display(), "writing output cache");
            cache::write(&path, &output)?;
        }
        Ok(())
    }

    fn finished_error(&self, call: &'static str) -> JobError {
        JobError::Finished { job: self.name().to_string(), call }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("name", &self.name()).field("state", &self.state()).finish()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
