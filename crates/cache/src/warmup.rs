// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, batched cache warmup. The original queried
//! `cache_access_log` directly from a `DatabaseManager*`; the persistent
//! store is out of scope here (§1), so the query is replaced by an injected
//! [`WarmupSource`] trait that yields the same `(key, data_type)` rows.

use async_trait::async_trait;

/// One row a warmup source reports: a cache key and the data-type tag used
/// to pick its TTL (`user`, `job`, `session`, or anything else for the
/// default TTL).
#[derive(Debug, Clone)]
pub struct WarmupKey {
    pub key: String,
    pub data_type: String,
}

#[async_trait]
pub trait WarmupSource: Send + Sync {
    /// Return up to `max_keys` warmup candidates, most-frequently-accessed
    /// first.
    async fn fetch_warmup_keys(&self, max_keys: usize) -> Vec<WarmupKey>;
}

/// Outcome of a warmup run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WarmupReport {
    pub loaded: u64,
    pub errors: u64,
    pub duration_ms: u64,
    pub timed_out: bool,
}
