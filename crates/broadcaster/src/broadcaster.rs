// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out message broadcaster, ported from `message_broadcaster.hpp`'s
//! `MessageBroadcaster`, using the same `tokio::spawn` + `tokio::select!`
//! dual-wake idiom as `daemon/src/listener/mod.rs::run_dual`.

use crate::config::BroadcasterConfig;
use crate::entry::QueueEntry;
use crate::error::BroadcasterError;
use crate::stats::{BroadcasterStats, BroadcasterStatsSnapshot};
use async_trait::async_trait;
use bytes::Bytes;
use etlmon_core::{Clock, JobId, LogLevel, Message, MessageKind, ObservedEvent, Observer, Timestamp};
use etlmon_locking::{LockLevel, OrderedMutex};
use etlmon_metrics::{MetricsPublisher, MetricsSnapshot};
use etlmon_pool::ConnectionPool;
use etlmon_session::Session;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

fn encode_frame(message: &Message) -> Bytes {
    match serde_json::to_vec(message) {
        Ok(bytes) => Bytes::from(bytes),
        Err(_) => Bytes::new(),
    }
}

pub struct MessageBroadcaster {
    config: BroadcasterConfig,
    pool: Arc<ConnectionPool>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    queue: OrderedMutex<BinaryHeap<QueueEntry>>,
    enqueue_seq: AtomicU64,
    stats: BroadcasterStats,
    running: AtomicBool,
    wake: Notify,
    workers: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl MessageBroadcaster {
    pub fn new(
        config: BroadcasterConfig,
        pool: Arc<ConnectionPool>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
    ) -> Arc<Self> {
        let now = clock.now();
        Arc::new(Self {
            config,
            pool,
            clock,
            observer,
            queue: OrderedMutex::new("broadcaster.queue", LockLevel::State, BinaryHeap::new()),
            enqueue_seq: AtomicU64::new(0),
            stats: BroadcasterStats::new(now),
            running: AtomicBool::new(false),
            wake: Notify::new(),
            workers: parking_lot::Mutex::new(Vec::new()),
        })
    }

    fn next_seq(&self) -> u64 {
        self.enqueue_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Non-blocking enqueue. If the heap would exceed `max_queue_size`, the
    /// lowest-priority entry currently in the heap is dropped (not
    /// necessarily the incoming one).
    pub fn publish(&self, message: Message) -> Result<(), BroadcasterError> {
        let entry = QueueEntry { message, enqueue_seq: self.next_seq() };
        let mut queue = self.queue.lock()?;
        queue.push(entry);
        let overflowed = queue.len() > self.config.max_queue_size;
        if overflowed {
            drop_lowest_priority(&mut queue);
        }
        drop(queue);

        self.stats.record_enqueued();
        if overflowed {
            self.stats.record_dropped();
            self.observer.observe(ObservedEvent::MessageDropped { reason: "queue_overflow" });
        }
        self.wake.notify_one();
        Ok(())
    }

    pub fn publish_to_job(&self, payload: serde_json::Value, job_id: JobId) -> Result<(), BroadcasterError> {
        self.publish(Message::new(MessageKind::JobStatusUpdate, payload).with_job(job_id))
    }

    pub fn publish_log(&self, payload: serde_json::Value, job_id: JobId, level: LogLevel) -> Result<(), BroadcasterError> {
        self.publish(Message::new(MessageKind::LogMessage, payload).with_job(job_id).with_level(level))
    }

    /// Bypasses filters; delivers to exactly one session.
    pub async fn send_direct(&self, session_id: &etlmon_core::SessionId, payload: serde_json::Value) -> Result<(), BroadcasterError> {
        let session = self
            .pool
            .get(session_id)?
            .ok_or_else(|| BroadcasterError::SessionNotFound { session_id: session_id.to_string() })?;
        let message = Message::new(MessageKind::SystemNotification, payload);
        let frame = encode_frame(&message);
        session
            .enqueue_frame(frame)
            .map_err(|_| BroadcasterError::SessionClosed { session_id: session_id.to_string() })?;
        self.stats.record_sent(1, self.clock.now(), Timestamp::from_epoch_ms(self.clock.epoch_ms()));
        Ok(())
    }

    /// Fan-out with a caller-supplied session predicate instead of
    /// per-session filters.
    pub fn broadcast_filtered(&self, message: Message, predicate: impl Fn(&Session) -> bool) -> Result<usize, BroadcasterError> {
        let sessions = self.pool.active_sessions()?;
        let frame = encode_frame(&message);
        let mut sent = 0u64;
        for session in sessions.iter().filter(|s| predicate(s)) {
            if session.enqueue_frame(frame.clone()).is_ok() {
                sent += 1;
            } else {
                self.stats.record_dropped();
            }
        }
        self.stats.record_sent(sent, self.clock.now(), Timestamp::from_epoch_ms(self.clock.epoch_ms()));
        Ok(sent as usize)
    }

    /// One fan-out iteration: pop up to `batch_size` entries, snapshot
    /// active sessions, deliver by filter match.
    async fn run_iteration(&self) -> Result<usize, BroadcasterError> {
        let batch: Vec<QueueEntry> = {
            let mut queue = self.queue.lock()?;
            let mut batch = Vec::with_capacity(self.config.batch_size.min(queue.len()));
            for _ in 0..self.config.batch_size {
                match queue.pop() {
                    Some(entry) => batch.push(entry),
                    None => break,
                }
            }
            batch
        };
        if batch.is_empty() {
            return Ok(0);
        }

        let sessions = self.pool.active_sessions()?;
        let mut sent = 0u64;
        for entry in &batch {
            let frame = encode_frame(&entry.message);
            for session in &sessions {
                if session.filters().accepts(&entry.message) {
                    if session.enqueue_frame(frame.clone()).is_ok() {
                        sent += 1;
                    } else {
                        self.stats.record_dropped();
                        self.observer.observe(ObservedEvent::MessageDropped { reason: "session_queue_full" });
                    }
                }
            }
        }
        self.stats.record_sent(sent, self.clock.now(), Timestamp::from_epoch_ms(self.clock.epoch_ms()));
        Ok(batch.len())
    }

    /// Drains the queue synchronously, honoring filters. Intended for tests
    /// and graceful shutdown.
    pub async fn flush(&self) -> Result<usize, BroadcasterError> {
        let mut processed = 0;
        loop {
            let n = self.run_iteration().await?;
            if n == 0 {
                break;
            }
            processed += n;
        }
        Ok(processed)
    }

    pub fn stats(&self) -> BroadcasterStatsSnapshot {
        let queue_size = self.queue.lock().map(|q| q.len()).unwrap_or(0);
        self.stats.snapshot(queue_size)
    }

    /// Spawn `min(max_concurrent_broadcasts, 4)` fan-out worker tasks.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let worker_count = self.config.max_concurrent_broadcasts.min(4).max(1);
        let mut workers = self.workers.lock();
        for _ in 0..worker_count {
            let broadcaster = self.clone();
            workers.push(tokio::spawn(async move { broadcaster.worker_loop().await }));
        }
    }

    async fn worker_loop(self: Arc<Self>) {
        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(self.config.processing_interval) => {}
            }
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            self.stats.begin_broadcast();
            if let Err(err) = self.run_iteration().await {
                tracing::warn!(error = %err, "broadcaster fan-out iteration failed");
            }
            self.stats.end_broadcast();
        }
    }

    /// Cooperative stop: flips `running` off, wakes all workers, waits for
    /// `active_broadcasts == 0`, then joins.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_waiters();
        while self.stats.active_broadcasts() > 0 {
            tokio::task::yield_now().await;
        }
        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

fn drop_lowest_priority(heap: &mut BinaryHeap<QueueEntry>) {
    let vec: Vec<QueueEntry> = std::mem::take(heap).into_vec();
    let mut vec = vec;
    if let Some((min_idx, _)) = vec.iter().enumerate().min_by(|a, b| a.1.cmp(b.1)) {
        vec.remove(min_idx);
    }
    *heap = BinaryHeap::from(vec);
}

#[async_trait]
impl MetricsPublisher for MessageBroadcaster {
    async fn publish(&self, job_id: &JobId, snapshot: MetricsSnapshot) {
        let payload = serde_json::to_value(&snapshot).unwrap_or(serde_json::Value::Null);
        let message = Message::new(MessageKind::MetricsUpdate, payload).with_job(job_id.clone());
        if let Err(err) = MessageBroadcaster::publish(self, message) {
            tracing::warn!(job_id = %job_id, error = %err, "failed to publish metrics update");
        }
    }
}

#[cfg(test)]
#[path = "broadcaster_tests.rs"]
mod tests;
