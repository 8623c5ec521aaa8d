// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hit_rate_is_zero_with_no_traffic() {
    let stats = CacheStats::default();
    assert_eq!(stats.snapshot().hit_rate, 0.0);
}

#[test]
fn hit_rate_reflects_hits_over_total_lookups() {
    let stats = CacheStats::default();
    stats.record_hit();
    stats.record_hit();
    stats.record_miss();
    let snap = stats.snapshot();
    assert_eq!(snap.hits, 2);
    assert_eq!(snap.misses, 1);
    assert!((snap.hit_rate - (2.0 / 3.0)).abs() < 1e-9);
}
