// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secondary deadlock diagnostics, separate from the ascending-order check
//! in [`crate::level`]. The order check already rules out the cycles that
//! matter for this workspace's lock graph; this registry exists so an
//! operator can snapshot what every thread currently holds when debugging a
//! stall, the same role the original's `DeadlockDetector::getThreadLockInfo`
//! played.

use crate::level::LockLevel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

#[derive(Debug, Clone, Default)]
pub struct ThreadLockInfo {
    pub held: Vec<(LockLevel, String)>,
}

/// Registry of which locks each thread currently holds. Not wired
/// automatically into [`crate::OrderedMutex`] — callers that want the
/// diagnostic register and unregister explicitly around their critical
/// sections.
#[derive(Default)]
pub struct DeadlockDetector {
    enabled: AtomicBool,
    threads: RwLock<HashMap<ThreadId, ThreadLockInfo>>,
}

impl DeadlockDetector {
    pub fn new() -> Self {
        Self { enabled: AtomicBool::new(true), threads: RwLock::new(HashMap::new()) }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn register(&self, level: LockLevel, name: &str) {
        if !self.is_enabled() {
            return;
        }
        let id = std::thread::current().id();
        let mut threads = self.threads.write();
        threads.entry(id).or_default().held.push((level, name.to_string()));
    }

    pub fn unregister(&self, level: LockLevel, name: &str) {
        if !self.is_enabled() {
            return;
        }
        let id = std::thread::current().id();
        let mut threads = self.threads.write();
        if let Some(info) = threads.get_mut(&id) {
            if let Some(pos) = info.held.iter().position(|(l, n)| *l == level && n == name) {
                info.held.remove(pos);
            }
            if info.held.is_empty() {
                threads.remove(&id);
            }
        }
    }

    pub fn snapshot(&self) -> HashMap<ThreadId, ThreadLockInfo> {
        self.threads.read().clone()
    }

    /// Out-of-order holdings across the whole registry: any thread whose
    /// held locks aren't in ascending level order, which the per-thread
    /// check in [`crate::level`] should already prevent, so a non-empty
    /// result here indicates that check was bypassed somehow.
    // TODO: this is an O(threads * locks-per-thread) scan; fine at current
    // thread counts but revisit if the pool grows into the thousands.
    pub fn find_order_violations(&self) -> Vec<ThreadId> {
        self.threads
            .read()
            .iter()
            .filter(|(_, info)| {
                info.held.windows(2).any(|pair| pair[0].0 >= pair[1].0)
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
#[path = "deadlock_tests.rs"]
mod tests;
