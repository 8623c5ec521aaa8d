// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Ported from `ConnectionPool`'s config in `original_source/include/connection_pool.hpp`.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: usize,
    pub connection_timeout: Duration,
    pub health_check_interval: Duration,
    pub cleanup_batch_size: usize,
    pub enable_health_monitoring: bool,
    pub enable_cleanup: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            connection_timeout: Duration::from_secs(30),
            health_check_interval: Duration::from_secs(60),
            cleanup_batch_size: 10,
            enable_health_monitoring: true,
            enable_cleanup: true,
        }
    }
}
