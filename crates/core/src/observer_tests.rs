// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn emit_calls_in_registration_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observers: Observers<str> = Observers::new();
    for tag in ["a", "b", "c"] {
        let seen = Arc::clone(&seen);
        observers.register(move |value: &str| seen.lock().push(format!("{tag}:{value}")));
    }

    observers.emit("x");

    assert_eq!(*seen.lock(), vec!["a:x", "b:x", "c:x"]);
}

#[test]
fn emit_without_observers_is_noop() {
    let observers: Observers<u32> = Observers::default();
    assert!(observers.is_empty());
    observers.emit(&1);
}

#[test]
fn callback_may_register_during_emit() {
    let observers: Arc<Observers<u32>> = Arc::new(Observers::new());
    let inner = Arc::clone(&observers);
    observers.register(move |_| inner.register(|_| {}));

    observers.emit(&1);

    assert_eq!(observers.len(), 2);
}
