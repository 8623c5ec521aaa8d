// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic health monitoring, independent of the pool's own
//! running/stopped state (§4.2: "monitoring can be started/stopped
//! independently of pool start/stop").

use crate::pool::ConnectionPool;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a task that calls `perform_health_check` (and `cleanup_stale` if
/// enabled) every `interval`, until the returned handle is aborted.
pub fn spawn_health_monitor(pool: Arc<ConnectionPool>, interval: Duration, enable_cleanup: bool) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match pool.perform_health_check() {
                Ok(removed) if removed > 0 => tracing::debug!(removed, "health check removed sessions"),
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "health check failed"),
            }
            if enable_cleanup {
                match pool.cleanup_stale() {
                    Ok(removed) if removed > 0 => tracing::debug!(removed, "cleanup removed stale sessions"),
                    Ok(_) => {}
                    Err(err) => tracing::warn!(error = %err, "cleanup failed"),
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
