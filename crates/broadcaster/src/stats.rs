// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use etlmon_core::Timestamp;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Aggregate broadcaster statistics (§6's `BroadcasterStats` surface).
pub struct BroadcasterStats {
    messages_sent: AtomicU64,
    messages_queued: AtomicU64,
    messages_dropped: AtomicU64,
    active_broadcasts: AtomicUsize,
    last_message_sent: parking_lot::Mutex<Option<Timestamp>>,
    messages_per_second: parking_lot::Mutex<f64>,
    last_tick: parking_lot::Mutex<Instant>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BroadcasterStatsSnapshot {
    pub messages_sent: u64,
    pub messages_queued: u64,
    pub messages_dropped: u64,
    pub current_queue_size: usize,
    pub active_broadcasts: usize,
    pub messages_per_second: f64,
    pub last_message_sent: Option<Timestamp>,
}

const EMA_ALPHA: f64 = 0.3;

impl BroadcasterStats {
    pub fn new(now: Instant) -> Self {
        Self {
            messages_sent: AtomicU64::new(0),
            messages_queued: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            active_broadcasts: AtomicUsize::new(0),
            last_message_sent: parking_lot::Mutex::new(None),
            messages_per_second: parking_lot::Mutex::new(0.0),
            last_tick: parking_lot::Mutex::new(now),
        }
    }

    pub fn record_enqueued(&self) {
        self.messages_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self, count: u64, now: Instant, at: Timestamp) {
        if count == 0 {
            return;
        }
        self.messages_sent.fetch_add(count, Ordering::Relaxed);
        *self.last_message_sent.lock() = Some(at);
        self.update_rate(count, now);
    }

    fn update_rate(&self, count: u64, now: Instant) {
        let mut last_tick = self.last_tick.lock();
        let elapsed = now.duration_since(*last_tick).max(Duration::from_millis(1));
        *last_tick = now;
        let instantaneous = count as f64 / elapsed.as_secs_f64();
        let mut rate = self.messages_per_second.lock();
        *rate = EMA_ALPHA * instantaneous + (1.0 - EMA_ALPHA) * *rate;
    }

    pub fn begin_broadcast(&self) {
        self.active_broadcasts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn end_broadcast(&self) {
        self.active_broadcasts.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active_broadcasts(&self) -> usize {
        self.active_broadcasts.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, current_queue_size: usize) -> BroadcasterStatsSnapshot {
        BroadcasterStatsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_queued: self.messages_queued.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            current_queue_size,
            active_broadcasts: self.active_broadcasts(),
            messages_per_second: *self.messages_per_second.lock(),
            last_message_sent: *self.last_message_sent.lock(),
        }
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
