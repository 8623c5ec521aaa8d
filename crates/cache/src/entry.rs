// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use smallvec::SmallVec;
use std::time::Instant;

/// A cached value with lazy expiry: nothing proactively evicts an expired
/// entry, `get` just treats it as absent and removes it on next touch.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub tags: SmallVec<[String; 2]>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
