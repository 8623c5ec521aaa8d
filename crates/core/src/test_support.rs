// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only helpers shared across the workspace's crates.

use crate::observer::{ObservedEvent, Observer};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every observed event for assertions in tests.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&ObservedEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| matches(e)).count()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}
