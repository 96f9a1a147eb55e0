// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Headless driver: start a job graph, report what happens and wait for it.

use std::sync::Arc;

use relprep_core::{Job, JobError, Pipe};

/// Where the driver reports job output and errors.
pub trait Reporter: Send + Sync + 'static {
    fn output(&self, job: &Job, output: &str);
    fn error(&self, job: &Job, error: &str);
}

/// Output to stdout, errors to stderr.
pub struct Terminal;

impl Reporter for Terminal {
    fn output(&self, _job: &Job, output: &str) {
        println!("{output}");
    }

    fn error(&self, job: &Job, error: &str) {
        eprintln!("{}: {}", crate::color::label(job.label()), crate::color::error(error));
    }
}

/// Jobs to run and the pipes between them.
///
/// Pipes are connected by the driver after it registered its own observers,
/// so an item is reported before the jobs it is piped into see it.
#[derive(Default)]
pub struct JobGraph {
    jobs: Vec<Job>,
    pipes: Vec<(Job, Job)>,
}

impl JobGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, job: &Job) {
        self.jobs.push(job.clone());
    }

    pub fn pipe(&mut self, sender: &Job, receiver: &Job) {
        self.pipes.push((sender.clone(), receiver.clone()));
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn pipes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pipes.iter().map(|(sender, receiver)| (sender.name(), receiver.name()))
    }
}

impl From<Vec<Job>> for JobGraph {
    fn from(jobs: Vec<Job>) -> Self {
        Self { jobs, pipes: Vec::new() }
    }
}

pub struct Driver {
    jobs: Vec<Job>,
    pipes: Vec<(Job, Job)>,
    reporter: Arc<dyn Reporter>,
}

impl Driver {
    pub fn new(graph: impl Into<JobGraph>) -> Self {
        Self::with_reporter(graph, Arc::new(Terminal))
    }

    pub fn with_reporter(graph: impl Into<JobGraph>, reporter: Arc<dyn Reporter>) -> Self {
        let JobGraph { jobs, pipes } = graph.into();
        Self { jobs, pipes, reporter }
    }

    /// Run all jobs to completion.
    ///
    /// Returns the first non-zero job exit code, or 0. A fatal job error
    /// finishes the remaining jobs and is returned instead.
    pub async fn run(self) -> Result<i32, JobError> {
        for job in &self.jobs {
            self.observe(job);
        }
        for (sender, receiver) in &self.pipes {
            Pipe::connect(sender, receiver);
        }
        for job in &self.jobs {
            if !job.is_started() {
                job.start();
            }
        }

        let mut fatal = None;
        for job in &self.jobs {
            if let Err(e) = job.wait().await {
                tracing::debug!(job = job.name(), error = %e, "fatal job error");
                if fatal.is_none() {
                    for other in &self.jobs {
                        other.finish();
                    }
                    fatal = Some(e);
                }
            }
        }
        if let Some(e) = fatal {
            return Err(e);
        }

        Ok(self
            .jobs
            .iter()
            .map(|job| job.exit_code().unwrap_or(1))
            .find(|code| *code != 0)
            .unwrap_or(0))
    }

    fn observe(&self, job: &Job) {
        if !job.quiet() {
            let reporter = Arc::clone(&self.reporter);
            let weak = job.downgrade();
            job.on_output(move |output| {
                if let Some(job) = weak.upgrade() {
                    reporter.output(&job, output);
                }
            });
        }

        let reporter = Arc::clone(&self.reporter);
        let weak = job.downgrade();
        job.on_error(move |error| {
            if let Some(job) = weak.upgrade() {
                reporter.error(&job, error);
            }
        });

        job.on_finished(|job| {
            tracing::debug!(job = job.name(), exit_code = ?job.exit_code(), "job finished");
        });
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
