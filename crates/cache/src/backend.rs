// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external store (Redis in the original) is out of scope — only its
//! health-check interface is specified (§1, §4.4).

use async_trait::async_trait;

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn ping(&self) -> bool;
}

/// Backend that's always healthy; the default when no real backend is wired
/// up, matching `isCacheHealthy()`'s no-redis fallback in the original.
pub struct AlwaysHealthy;

#[async_trait]
impl CacheBackend for AlwaysHealthy {
    async fn ping(&self) -> bool {
        true
    }
}
