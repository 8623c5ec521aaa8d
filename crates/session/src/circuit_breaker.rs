// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session circuit breaker, ported from `ConnectionCircuitBreaker` in
//! `websocket_connection_recovery.hpp`. The original guards its state with a
//! plain `std::mutex`; the Rust port uses `OrderedMutex` at `LockLevel::State`
//! so the lock-ordering invariant holds workspace-wide.

use crate::config::CircuitBreakerConfig;
use crate::error::SessionError;
use etlmon_core::{Clock, ObservedEvent, Observer};
use etlmon_locking::{LockLevel, OrderedMutex};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
}

pub struct CircuitBreaker {
    session_id: String,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    inner: OrderedMutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(
        session_id: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        let session_id = session_id.into();
        Self {
            inner: OrderedMutex::new(
                format!("circuit_breaker.{session_id}"),
                LockLevel::State,
                Inner { state: BreakerState::Closed, failure_count: 0, success_count: 0, last_failure_at: None },
            ),
            session_id,
            config,
            clock,
            observer,
        }
    }

    /// Whether an operation may proceed right now. `Open` transitions to
    /// `HalfOpen` (resetting the success counter) once the cool-down has
    /// elapsed, matching `allowOperation()`.
    pub fn allow_operation(&self) -> Result<bool, SessionError> {
        let mut inner = self.inner.lock()?;
        match inner.state {
            BreakerState::Closed => Ok(true),
            BreakerState::HalfOpen => Ok(true),
            BreakerState::Open => {
                let expired = inner
                    .last_failure_at
                    .map(|at| self.clock.now().duration_since(at) >= self.config.timeout)
                    .unwrap_or(true);
                if expired {
                    inner.state = BreakerState::HalfOpen;
                    inner.success_count = 0;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
        }
    }

    pub fn on_success(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock()?;
        match inner.state {
            BreakerState::Closed => inner.failure_count = 0,
            BreakerState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = BreakerState::Closed;
                    inner.failure_count = 0;
                    drop(inner);
                    self.observer.observe(ObservedEvent::CircuitBreakerClosed { session_id: self.session_id.clone() });
                }
            }
            BreakerState::Open => {}
        }
        Ok(())
    }

    pub fn on_failure(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock()?;
        match inner.state {
            BreakerState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = BreakerState::Open;
                    inner.last_failure_at = Some(self.clock.now());
                    drop(inner);
                    self.observer.observe(ObservedEvent::CircuitBreakerOpened { session_id: self.session_id.clone() });
                }
            }
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.last_failure_at = Some(self.clock.now());
                drop(inner);
                self.observer.observe(ObservedEvent::CircuitBreakerOpened { session_id: self.session_id.clone() });
            }
            BreakerState::Open => {
                inner.last_failure_at = Some(self.clock.now());
            }
        }
        Ok(())
    }

    pub fn state(&self) -> Result<BreakerState, SessionError> {
        Ok(self.inner.lock()?.state)
    }

    pub fn failure_count(&self) -> Result<u32, SessionError> {
        Ok(self.inner.lock()?.failure_count)
    }
}

#[cfg(test)]
#[path = "circuit_breaker_tests.rs"]
mod tests;
