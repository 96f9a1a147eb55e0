// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use crate::WorkerFn;

/// Worker functions by target name, for the `worker` entry point.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<&'static str, WorkerFn>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, target: &'static str, worker: WorkerFn) -> Self {
        self.workers.insert(target, worker);
        self
    }

    pub fn get(&self, target: &str) -> Option<WorkerFn> {
        self.workers.get(target).copied()
    }

    pub fn targets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.workers.keys().copied()
    }
}
