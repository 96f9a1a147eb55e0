// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable job kind for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{CacheArgs, Job, JobError, JobKind};

/// Records every hook call and optionally sends canned output on execute.
pub struct FakeKind {
    name: &'static str,
    args: Option<CacheArgs>,
    sends: Vec<String>,
    finish_on_execute: bool,
    pipeable: bool,
    invalid: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeKind {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Some(CacheArgs::new()),
            sends: Vec::new(),
            finish_on_execute: false,
            pipeable: false,
            invalid: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn args(mut self, args: CacheArgs) -> Self {
        self.args = Some(args);
        self
    }

    pub fn uncached(mut self) -> Self {
        self.args = None;
        self
    }

    /// Send `items` and finish when executed.
    pub fn sends(mut self, items: &[&str]) -> Self {
        self.sends = items.iter().map(|s| s.to_string()).collect();
        self.finish_on_execute = true;
        self
    }

    pub fn pipeable(mut self) -> Self {
        self.pipeable = true;
        self
    }

    /// Report `error` and finish from `initialize`.
    pub fn invalid(mut self, error: &str) -> Self {
        self.invalid = Some(error.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl JobKind for FakeKind {
    fn name(&self) -> &str {
        self.name
    }

    fn label(&self) -> &str {
        "Fake"
    }

    fn initialize(&self, job: &Job) {
        if let Some(error) = &self.invalid {
            job.error_if_not_finished(error);
            job.finish();
        }
    }

    fn execute(&self, job: &Job) {
        self.calls.lock().push("execute".to_string());
        for item in &self.sends {
            job.send_if_not_finished(item);
        }
        if self.finish_on_execute {
            job.finish();
        }
    }

    fn pipe_input(&self, job: &Job, value: &str) -> Result<(), JobError> {
        if !self.pipeable {
            return Err(JobError::PipeUnsupported { job: self.name.to_string(), hook: "pipe_input" });
        }
        self.calls.lock().push(format!("pipe_input:{value}"));
        job.send(value)
    }

    fn pipe_closed(&self, job: &Job) -> Result<(), JobError> {
        if !self.pipeable {
            return Err(JobError::PipeUnsupported { job: self.name.to_string(), hook: "pipe_closed" });
        }
        self.calls.lock().push("pipe_closed".to_string());
        job.finish();
        Ok(())
    }

    fn cache_args(&self) -> Option<CacheArgs> {
        self.args.clone()
    }

    fn finishing(&self, _job: &Job) {
        self.calls.lock().push("finishing".to_string());
    }
}
