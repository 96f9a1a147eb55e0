// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-instance observer lists.
//!
//! Each job (and each job kind that reports extra events) owns its
//! observer lists. Payload types are fixed per list, so there is no
//! name-based signal lookup.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Observers<T: ?Sized> {
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T: ?Sized> Observers<T> {
    pub fn new() -> Self {
        Self { callbacks: Mutex::new(Vec::new()) }
    }

    /// Append `callback`; callbacks fire in registration order.
    pub fn register(&self, callback: impl Fn(&T) + Send + Sync + 'static) {
        self.callbacks.lock().push(Arc::new(callback));
    }

    /// Call every registered callback with `value`.
    ///
    /// The list is snapshotted first so callbacks may register further
    /// observers (or emit on other lists) without deadlocking.
    pub fn emit(&self, value: &T) {
        let callbacks = self.callbacks.lock().clone();
        for callback in callbacks {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
