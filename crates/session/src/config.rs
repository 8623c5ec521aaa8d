// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Session-level configuration, grounded on `ConnectionRecoveryConfig` in
/// `websocket_connection_recovery.hpp`. Defaults match the original exactly.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub send_queue_capacity: usize,
    pub enable_auto_reconnect: bool,
    pub max_reconnect_attempts: u32,
    pub base_reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
    pub backoff_multiplier: f64,
    pub message_queue_max_size: usize,
    pub enable_heartbeat: bool,
    pub heartbeat_interval: Duration,
    pub max_missed_heartbeats: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_queue_capacity: 256,
            enable_auto_reconnect: true,
            max_reconnect_attempts: 5,
            base_reconnect_delay: Duration::from_millis(1000),
            max_reconnect_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            message_queue_max_size: 1000,
            enable_heartbeat: true,
            heartbeat_interval: Duration::from_secs(30),
            max_missed_heartbeats: 3,
        }
    }
}

/// Circuit breaker thresholds, grounded on `ConnectionCircuitBreaker`'s
/// constructor in `websocket_connection_recovery.hpp`. The original's
/// defaults (failureThreshold=5, timeout=60s, successThreshold=3) are kept
/// as the Rust defaults too; callers needing different thresholds (e.g. the
/// testable-properties scenario's failureThreshold=3/successThreshold=2)
/// pass them explicitly.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, success_threshold: 3, timeout: Duration::from_secs(60) }
    }
}
