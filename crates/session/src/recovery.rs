// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnection backoff and pending-message buffering, ported from
//! `ConnectionRecoveryState` in `websocket_connection_recovery.hpp`.

use crate::config::SessionConfig;
use bytes::Bytes;
use etlmon_core::Clock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// `delay(attempt) = min(base * multiplier^(attempt-1), max)`. Attempt 0 (or
/// negative, which can't happen with `u32`) is treated as attempt 1, mirroring
/// `calculateBackoffDelay`'s `if (attempts <= 0) return baseReconnectDelay;`.
pub fn backoff_delay(attempt: u32, base: Duration, multiplier: f64, max: Duration) -> Duration {
    if attempt <= 1 {
        return base;
    }
    let scaled = base.as_secs_f64() * multiplier.powi(attempt as i32 - 1);
    Duration::from_secs_f64(scaled).min(max)
}

pub struct RecoveryState {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    is_recovering: AtomicBool,
    reconnect_attempts: AtomicU32,
    missed_heartbeats: AtomicU32,
    last_heartbeat: Mutex<Option<Instant>>,
    last_reconnect_at: Mutex<Option<Instant>>,
    pending: Mutex<VecDeque<Bytes>>,
}

impl RecoveryState {
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            is_recovering: AtomicBool::new(false),
            reconnect_attempts: AtomicU32::new(0),
            missed_heartbeats: AtomicU32::new(0),
            last_heartbeat: Mutex::new(None),
            last_reconnect_at: Mutex::new(None),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_recovering(&self) -> bool {
        self.is_recovering.load(Ordering::SeqCst)
    }

    pub fn enter_recovery(&self) {
        self.is_recovering.store(true, Ordering::SeqCst);
    }

    pub fn missed_heartbeats(&self) -> u32 {
        self.missed_heartbeats.load(Ordering::SeqCst)
    }

    /// Last time liveness evidence was observed, used by the pool as the
    /// stand-in for "last activity" since the real socket is out of scope.
    pub fn last_heartbeat(&self) -> Option<Instant> {
        *self.last_heartbeat.lock()
    }

    pub fn note_heartbeat(&self) {
        self.missed_heartbeats.store(0, Ordering::SeqCst);
        *self.last_heartbeat.lock() = Some(self.clock.now());
    }

    /// Returns `true` once `max_missed_heartbeats` is reached.
    pub fn note_missed_heartbeat(&self) -> bool {
        let missed = self.missed_heartbeats.fetch_add(1, Ordering::SeqCst) + 1;
        missed >= self.config.max_missed_heartbeats
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::SeqCst)
    }

    /// Advance to the next attempt and return its backoff delay, or `None`
    /// if `max_reconnect_attempts` has been exhausted.
    pub fn next_backoff(&self) -> Option<Duration> {
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt > self.config.max_reconnect_attempts {
            return None;
        }
        Some(backoff_delay(
            attempt,
            self.config.base_reconnect_delay,
            self.config.backoff_multiplier,
            self.config.max_reconnect_delay,
        ))
    }

    /// Called on a successful reconnect: resets attempts and recovery flag.
    pub fn on_reconnected(&self) {
        self.is_recovering.store(false, Ordering::SeqCst);
        self.reconnect_attempts.store(0, Ordering::SeqCst);
        self.missed_heartbeats.store(0, Ordering::SeqCst);
        *self.last_reconnect_at.lock() = Some(self.clock.now());
    }

    /// Append a frame destined for this session while it is recovering.
    /// Drops the oldest entry first if the buffer is already at
    /// `message_queue_max_size`, matching `addPendingMessage`.
    pub fn buffer_pending(&self, frame: Bytes) {
        let mut pending = self.pending.lock();
        while pending.len() >= self.config.message_queue_max_size {
            pending.pop_front();
        }
        pending.push_back(frame);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drain the entire buffer in FIFO order.
    pub fn flush_pending(&self) -> Vec<Bytes> {
        self.pending.lock().drain(..).collect()
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
