// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! etlmon-pool: bounded registry of active sessions with lifecycle, health,
//! and cleanup.

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod error;
mod monitor;
mod pool;
mod stats;

pub use config::PoolConfig;
pub use error::PoolError;
pub use monitor::spawn_health_monitor;
pub use pool::ConnectionPool;
pub use stats::PoolStats;
