// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One WebSocket session's lifecycle: filtered send, heartbeat, and
//! reconnection-backoff state (§4.5). The actual socket read/write is out of
//! scope (§1) — this module drives a [`FrameSink`] and is fed liveness
//! evidence externally via [`Session::note_heartbeat`].

use crate::circuit_breaker::{BreakerState, CircuitBreaker};
use crate::config::{CircuitBreakerConfig, SessionConfig};
use crate::error::SessionError;
use crate::queue::SendQueue;
use crate::recovery::RecoveryState;
use crate::sink::FrameSink;
use bytes::Bytes;
use etlmon_core::{Clock, ConnectionFilters, ObservedEvent, Observer, SessionId};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// `handshaking -> open -> recovering -> open` loop, or `-> closing ->
/// closed` (terminal). Enforced with an explicit enum rather than allowing
/// arbitrary jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Handshaking = 0,
    Open = 1,
    Recovering = 2,
    Closing = 3,
    Closed = 4,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Handshaking,
            1 => Self::Open,
            2 => Self::Recovering,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

pub struct Session {
    id: SessionId,
    state: AtomicU8,
    filters: RwLock<ConnectionFilters>,
    observer: Arc<dyn Observer>,
    send_queue: Arc<SendQueue>,
    recovery: RecoveryState,
    circuit_breaker: CircuitBreaker,
    sink: AsyncMutex<Box<dyn FrameSink>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session in `handshaking` state and spawn its writer task,
    /// the single task that owns the `FrameSink` and drains the send-queue
    /// one frame at a time.
    pub fn spawn(
        config: SessionConfig,
        breaker_config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
        sink: Box<dyn FrameSink>,
    ) -> Arc<Self> {
        let id = SessionId::new();
        let send_queue = Arc::new(SendQueue::new(config.send_queue_capacity));
        let circuit_breaker = CircuitBreaker::new(id.as_str(), breaker_config, clock.clone(), observer.clone());
        let recovery = RecoveryState::new(config, clock);

        let session = Arc::new(Self {
            id,
            state: AtomicU8::new(SessionState::Handshaking as u8),
            filters: RwLock::new(ConnectionFilters::default()),
            observer,
            recovery,
            circuit_breaker,
            send_queue,
            sink: AsyncMutex::new(sink),
            writer: Mutex::new(None),
        });

        let worker = session.clone();
        let handle = tokio::spawn(async move { worker.run_writer().await });
        *session.writer.lock() = Some(handle);
        session
    }

    async fn run_writer(self: Arc<Self>) {
        while let Some(frame) = self.send_queue.pop().await {
            let result = {
                let mut sink = self.sink.lock().await;
                sink.send(frame).await
            };
            let outcome = match result {
                Ok(()) => self.circuit_breaker.on_success(),
                Err(err) => {
                    tracing::debug!(session = %self.id, error = %err, "frame send failed");
                    self.circuit_breaker.on_failure()
                }
            };
            if let Err(err) = outcome {
                tracing::warn!(session = %self.id, error = %err, "circuit breaker update failed");
            }
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, from: SessionState, to: SessionState) -> Result<(), SessionError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| SessionError::InvalidTransition { from, to })
    }

    pub fn filters(&self) -> ConnectionFilters {
        self.filters.read().clone()
    }

    pub fn set_filters(&self, filters: ConnectionFilters) {
        *self.filters.write() = filters;
    }

    pub fn accept_handshake(&self) -> Result<(), SessionError> {
        self.transition(SessionState::Handshaking, SessionState::Open)
    }

    /// Enqueue a frame for delivery. While recovering, frames are buffered
    /// in `RecoveryState` instead of the live send-queue; otherwise they are
    /// pushed onto the send-queue (dropping the oldest on overflow).
    pub fn enqueue_frame(&self, frame: Bytes) -> Result<(), SessionError> {
        if self.state() == SessionState::Closed {
            return Err(SessionError::Closed { session_id: self.id.to_string() });
        }
        if self.recovery.is_recovering() {
            self.recovery.buffer_pending(frame);
            return Ok(());
        }
        if self.send_queue.push(frame) {
            self.observer.observe(ObservedEvent::MessageDropped { reason: "send_queue_full" });
        }
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.recovery.pending_len()
    }

    pub fn send_queue_len(&self) -> usize {
        self.send_queue.len()
    }

    pub fn note_heartbeat(&self) {
        self.recovery.note_heartbeat();
    }

    /// Called by an external heartbeat loop every `heartbeat_interval`.
    /// Transitions to `recovering` once `max_missed_heartbeats` is reached.
    pub fn tick_heartbeat(&self) -> Result<(), SessionError> {
        if self.recovery.note_missed_heartbeat() {
            self.enter_recovery()?;
        }
        Ok(())
    }

    pub fn enter_recovery(&self) -> Result<(), SessionError> {
        self.transition(SessionState::Open, SessionState::Recovering)?;
        self.recovery.enter_recovery();
        Ok(())
    }

    /// Swap in a freshly accepted sink after a successful reconnect, flush
    /// pending frames onto the live queue in FIFO order, then resume.
    pub async fn reconnect(&self, new_sink: Box<dyn FrameSink>) -> Result<(), SessionError> {
        let pending = self.recovery.flush_pending();
        {
            let mut sink = self.sink.lock().await;
            *sink = new_sink;
        }
        for frame in pending {
            self.send_queue.push(frame);
        }
        self.recovery.on_reconnected();
        self.transition(SessionState::Recovering, SessionState::Open)
    }

    pub fn circuit_state(&self) -> Result<BreakerState, SessionError> {
        self.circuit_breaker.state()
    }

    /// Whether this session is stale: not open, or no liveness evidence
    /// within `timeout`. The pool uses this for `cleanupStale`/
    /// `performHealthCheck`; the real socket that would otherwise drive
    /// activity timestamps is out of scope here, so the last heartbeat
    /// stands in for "last activity".
    pub fn is_stale(&self, now: std::time::Instant, timeout: std::time::Duration) -> bool {
        if self.state() != SessionState::Open {
            return true;
        }
        match self.recovery.last_heartbeat() {
            Some(at) => now.duration_since(at) >= timeout,
            None => false,
        }
    }

    /// Whether the session may currently be handed new traffic: open and
    /// its circuit breaker allows operations.
    pub fn is_healthy(&self) -> Result<bool, SessionError> {
        Ok(self.state() == SessionState::Open && self.circuit_breaker.allow_operation()?)
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        if self.state() == SessionState::Closed {
            return Ok(());
        }
        self.state.store(SessionState::Closing as u8, Ordering::SeqCst);
        self.send_queue.close();
        let handle = self.writer.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.state.store(SessionState::Closed as u8, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
