// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Tuning knobs for [`crate::CacheManager`], grounded on
/// `original_source/include/cache_manager.hpp`'s `CacheConfig`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub default_ttl: Duration,
    pub user_ttl: Duration,
    pub job_ttl: Duration,
    pub session_ttl: Duration,
    pub health_check_ttl: Duration,
    pub max_cache_size: usize,
    pub cache_prefix: String,
    pub enable_warmup: bool,
    pub warmup_batch_size: usize,
    pub warmup_max_keys: usize,
    pub warmup_batch_timeout: Duration,
    pub warmup_total_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(300),
            user_ttl: Duration::from_secs(600),
            job_ttl: Duration::from_secs(60),
            session_ttl: Duration::from_secs(1800),
            health_check_ttl: Duration::from_secs(30),
            max_cache_size: 10_000,
            cache_prefix: "etlmon:".to_string(),
            enable_warmup: true,
            warmup_batch_size: 10,
            warmup_max_keys: 100,
            warmup_batch_timeout: Duration::from_secs(5),
            warmup_total_timeout: Duration::from_secs(60),
        }
    }
}
