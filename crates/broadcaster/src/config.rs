// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Ported from `message_broadcaster.hpp`'s `BroadcasterConfig`.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    pub max_queue_size: usize,
    pub batch_size: usize,
    pub processing_interval: Duration,
    pub max_concurrent_broadcasts: usize,
    pub enable_async_processing: bool,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10_000,
            batch_size: 50,
            processing_interval: Duration::from_millis(10),
            max_concurrent_broadcasts: 10,
            enable_async_processing: true,
        }
    }
}
