// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session's live send-queue: a bounded FIFO drained by exactly one
//! writer task, generalizing the pending-message buffer's drop-oldest
//! overflow semantics (`addPendingMessage` in
//! `websocket_connection_recovery.hpp`) to the live path too.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

pub struct SendQueue {
    capacity: usize,
    queue: Mutex<VecDeque<Bytes>>,
    notify: Notify,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl SendQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Push a frame, dropping the oldest queued frame first if already at
    /// capacity. Returns whether a frame was dropped.
    pub fn push(&self, frame: Bytes) -> bool {
        let mut queue = self.queue.lock();
        let dropped = if queue.len() >= self.capacity {
            queue.pop_front();
            true
        } else {
            false
        };
        queue.push_back(frame);
        drop(queue);
        if dropped {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
        dropped
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wake the writer task and make future `pop` calls return `None` once
    /// drained, so it can exit cleanly.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Pop the oldest frame, waiting for one to arrive. Returns `None` once
    /// the queue is closed and empty.
    pub async fn pop(&self) -> Option<Bytes> {
        loop {
            let notified = self.notify.notified();
            if let Some(frame) = self.queue.lock().pop_front() {
                return Some(frame);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
