// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use etlmon_core::Timestamp;

/// A read-only snapshot derived on demand from the pool's current session
/// map. Never stored as authoritative state — computing it twice in a row
/// can yield different numbers if sessions churned in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub total_sessions: usize,
    pub open_sessions: usize,
    pub inactive_sessions: usize,
    pub healthy_sessions: usize,
    pub unhealthy_sessions: usize,
    pub max_connections: usize,
    pub last_health_check_at: Option<Timestamp>,
    pub last_cleanup_at: Option<Timestamp>,
}
