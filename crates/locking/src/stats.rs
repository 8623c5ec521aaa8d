// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-lock acquisition statistics, mirroring the original's `LockMonitor`
//! but owned by whoever constructs a [`crate::OrderedMutex`] rather than a
//! process-wide singleton.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct LockStats {
    acquisitions: AtomicU64,
    failures: AtomicU64,
    total_wait_us: AtomicU64,
    max_wait_us: AtomicU64,
    contentions: AtomicU64,
}

/// Point-in-time snapshot of a lock's accumulated stats.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LockStatsSnapshot {
    pub acquisitions: u64,
    pub failures: u64,
    pub total_wait_us: u64,
    pub max_wait_us: u64,
    pub contentions: u64,
}

impl LockStatsSnapshot {
    pub fn average_wait_us(&self) -> f64 {
        if self.acquisitions == 0 {
            0.0
        } else {
            self.total_wait_us as f64 / self.acquisitions as f64
        }
    }

    pub fn failure_rate(&self) -> f64 {
        let total = self.acquisitions + self.failures;
        if total == 0 {
            0.0
        } else {
            self.failures as f64 / total as f64
        }
    }
}

impl LockStats {
    fn record_acquisition(&self, wait: Duration, contended: bool) {
        let wait_us = wait.as_micros() as u64;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.total_wait_us.fetch_add(wait_us, Ordering::Relaxed);
        self.max_wait_us.fetch_max(wait_us, Ordering::Relaxed);
        if contended {
            self.contentions.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LockStatsSnapshot {
        LockStatsSnapshot {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            total_wait_us: self.total_wait_us.load(Ordering::Relaxed),
            max_wait_us: self.max_wait_us.load(Ordering::Relaxed),
            contentions: self.contentions.load(Ordering::Relaxed),
        }
    }
}

/// Registry of per-lock-name statistics. Cheap to share via `Arc` and safe
/// to hold across many [`crate::OrderedMutex`] instances.
#[derive(Default)]
pub struct LockStatsRegistry {
    by_name: RwLock<HashMap<String, LockStats>>,
}

impl LockStatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_acquisition(&self, name: &str, wait: Duration, contended: bool) {
        self.with_entry(name, |stats| stats.record_acquisition(wait, contended));
    }

    pub(crate) fn record_failure(&self, name: &str) {
        self.with_entry(name, |stats| stats.record_failure());
    }

    fn with_entry(&self, name: &str, f: impl FnOnce(&LockStats)) {
        if let Some(stats) = self.by_name.read().get(name) {
            f(stats);
            return;
        }
        let mut guard = self.by_name.write();
        f(guard.entry(name.to_string()).or_default());
    }

    pub fn get(&self, name: &str) -> LockStatsSnapshot {
        self.by_name.read().get(name).map(LockStats::snapshot).unwrap_or_default()
    }

    pub fn all(&self) -> Vec<(String, LockStatsSnapshot)> {
        self.by_name.read().iter().map(|(name, stats)| (name.clone(), stats.snapshot())).collect()
    }

    pub fn reset(&self) {
        self.by_name.write().clear();
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
