// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn records_acquisitions_and_computes_averages() {
    let registry = LockStatsRegistry::new();
    registry.record_acquisition("pool", Duration::from_micros(100), false);
    registry.record_acquisition("pool", Duration::from_micros(300), true);

    let snap = registry.get("pool");
    assert_eq!(snap.acquisitions, 2);
    assert_eq!(snap.contentions, 1);
    assert_eq!(snap.max_wait_us, 300);
    assert_eq!(snap.average_wait_us(), 200.0);
}

#[test]
fn failure_rate_counts_failures_against_total_attempts() {
    let registry = LockStatsRegistry::new();
    registry.record_acquisition("pool", Duration::from_micros(10), false);
    registry.record_failure("pool");
    registry.record_failure("pool");

    let snap = registry.get("pool");
    assert_eq!(snap.failures, 2);
    assert!((snap.failure_rate() - (2.0 / 3.0)).abs() < 1e-9);
}

#[test]
fn unknown_lock_name_returns_zeroed_snapshot() {
    let registry = LockStatsRegistry::new();
    assert_eq!(registry.get("missing"), LockStatsSnapshot::default());
}

#[test]
fn reset_clears_all_entries() {
    let registry = LockStatsRegistry::new();
    registry.record_acquisition("pool", Duration::from_micros(10), false);
    registry.reset();
    assert!(registry.all().is_empty());
}
