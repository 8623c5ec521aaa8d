// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer seam for statistics/events that the original implementation
//! pushed through global singletons (`LockMonitor::getInstance()`, metrics
//! alert callbacks registered as mutable globals). Per the "Global singleton"
//! redesign note, pool/broadcaster/session/cache all take an
//! `Arc<dyn Observer>` at construction instead, so tests can substitute a
//! recording observer and production can substitute a metrics-backed one.

use std::sync::Arc;

/// A structured event an observer may want to record. Kept as a flat enum
/// rather than a trait-per-event so observers can match exhaustively without
/// needing one method per call site.
#[derive(Debug, Clone)]
pub enum ObservedEvent {
    LockAcquired { name: String, wait_us: u64, contended: bool },
    LockTimedOut { name: String, timeout_ms: u64 },
    LockOrderViolation { name: String },
    PoolSessionAdded { session_id: String },
    PoolSessionRemoved { session_id: String },
    PoolCleanupRan { removed: usize },
    MessageDropped { reason: &'static str },
    MessageSent { session_id: String },
    CircuitBreakerOpened { session_id: String },
    CircuitBreakerClosed { session_id: String },
    CacheWarmupCompleted { loaded: u64, errors: u64, duration_ms: u64 },
}

/// Methods are called synchronously from whatever thread produced the event
/// and must not block (mirrors the constraint on the original's alert
/// callbacks in `system_metrics.hpp`).
pub trait Observer: Send + Sync {
    fn observe(&self, event: ObservedEvent);
}

/// Default observer: forwards everything to `tracing` at an appropriate level.
#[derive(Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: ObservedEvent) {
        match event {
            ObservedEvent::LockOrderViolation { name } => {
                tracing::error!(lock = %name, "lock order violation");
            }
            ObservedEvent::LockTimedOut { name, timeout_ms } => {
                tracing::warn!(lock = %name, timeout_ms, "lock acquisition timed out");
            }
            ObservedEvent::CircuitBreakerOpened { session_id } => {
                tracing::warn!(session = %session_id, "circuit breaker opened");
            }
            ObservedEvent::MessageDropped { reason } => {
                tracing::debug!(reason, "message dropped");
            }
            other => tracing::trace!(?other, "observed event"),
        }
    }
}

/// Observer that discards everything; useful where an observer is required
/// but nothing should be recorded.
#[derive(Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _event: ObservedEvent) {}
}

pub fn default_observer() -> Arc<dyn Observer> {
    Arc::new(TracingObserver)
}
