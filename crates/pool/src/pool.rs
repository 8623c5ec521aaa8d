// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded registry of active sessions, ported from
//! `original_source/include/connection_pool.hpp`'s `ConnectionPool`, using
//! the same `Listener`-style lifecycle as `daemon/src/listener/mod.rs`.

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::stats::PoolStats;
use etlmon_core::{Clock, ObservedEvent, Observer, SessionId, Timestamp};
use etlmon_locking::{LockLevel, OrderedRwLock};
use etlmon_session::{BreakerState, Session, SessionState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared by `perform_health_check` and `stats()` so the two never disagree
/// about what counts as unhealthy.
fn is_unhealthy(session: &Session, now: Instant, timeout: Duration) -> bool {
    session.is_stale(now, timeout) || session.circuit_state().map(|c| c == BreakerState::Open).unwrap_or(true)
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    Constructed = 0,
    Running = 1,
    Stopped = 2,
}

/// `constructed -> running -> stopped`, one-shot. Restarting means
/// constructing a new pool.
pub struct ConnectionPool {
    config: PoolConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    state: AtomicU8,
    sessions: OrderedRwLock<HashMap<SessionId, Arc<Session>>>,
    last_health_check_at: parking_lot::Mutex<Option<Timestamp>>,
    last_cleanup_at: parking_lot::Mutex<Option<Timestamp>>,
}

impl ConnectionPool {
    pub fn new(config: PoolConfig, clock: Arc<dyn Clock>, observer: Arc<dyn Observer>) -> Self {
        Self {
            config,
            clock,
            observer,
            state: AtomicU8::new(PoolState::Constructed as u8),
            sessions: OrderedRwLock::new("pool.sessions", LockLevel::Container, HashMap::new()),
            last_health_check_at: parking_lot::Mutex::new(None),
            last_cleanup_at: parking_lot::Mutex::new(None),
        }
    }

    pub fn start(&self) -> Result<(), PoolError> {
        self.state
            .compare_exchange(
                PoolState::Constructed as u8,
                PoolState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|_| PoolError::NotRunning)
    }

    fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == PoolState::Running as u8
    }

    pub fn add(&self, session: Arc<Session>) -> Result<(), PoolError> {
        if !self.is_running() {
            return Err(PoolError::NotRunning);
        }
        let mut sessions = self.sessions.write()?;
        if sessions.len() >= self.config.max_connections && !sessions.contains_key(session.id()) {
            return Err(PoolError::CapacityExceeded { max: self.config.max_connections });
        }
        let id = session.id().clone();
        sessions.insert(id.clone(), session);
        drop(sessions);
        self.observer.observe(ObservedEvent::PoolSessionAdded { session_id: id.to_string() });
        Ok(())
    }

    /// Idempotent: no error if `id` is absent.
    pub fn remove(&self, id: &SessionId) -> Result<(), PoolError> {
        let removed = self.sessions.write()?.remove(id);
        if removed.is_some() {
            self.observer.observe(ObservedEvent::PoolSessionRemoved { session_id: id.to_string() });
        }
        Ok(())
    }

    pub fn get(&self, id: &SessionId) -> Result<Option<Arc<Session>>, PoolError> {
        Ok(self.sessions.read()?.get(id).cloned())
    }

    pub fn has(&self, id: &SessionId) -> Result<bool, PoolError> {
        Ok(self.sessions.read()?.contains_key(id))
    }

    /// Snapshot of currently-open sessions. The pool's view may change
    /// immediately after this call returns.
    pub fn active_sessions(&self) -> Result<Vec<Arc<Session>>, PoolError> {
        Ok(self.sessions.read()?.values().filter(|s| s.state() == SessionState::Open).cloned().collect())
    }

    pub fn by_filter(&self, predicate: impl Fn(&Session) -> bool) -> Result<Vec<Arc<Session>>, PoolError> {
        Ok(self.sessions.read()?.values().filter(|s| predicate(s)).cloned().collect())
    }

    pub fn len(&self) -> Result<usize, PoolError> {
        Ok(self.sessions.read()?.len())
    }

    /// Removes up to `cleanup_batch_size` stale sessions (not open, or no
    /// liveness evidence within `connection_timeout`). Not an error if zero
    /// are removed.
    pub fn cleanup_stale(&self) -> Result<usize, PoolError> {
        let now = self.clock.now();
        let timeout = self.config.connection_timeout;
        let stale: Vec<SessionId> = {
            let sessions = self.sessions.read()?;
            sessions
                .iter()
                .filter(|(_, s)| s.is_stale(now, timeout))
                .take(self.config.cleanup_batch_size)
                .map(|(id, _)| id.clone())
                .collect()
        };
        let removed = stale.len();
        if removed > 0 {
            let mut sessions = self.sessions.write()?;
            for id in &stale {
                sessions.remove(id);
            }
            drop(sessions);
            self.observer.observe(ObservedEvent::PoolCleanupRan { removed });
        }
        *self.last_cleanup_at.lock() = Some(Timestamp::from_epoch_ms(self.clock.epoch_ms()));
        Ok(removed)
    }

    /// Removes sessions failing `isHealthy` (open, within timeout, circuit
    /// not open).
    pub fn perform_health_check(&self) -> Result<usize, PoolError> {
        let now = self.clock.now();
        let timeout = self.config.connection_timeout;
        let unhealthy: Vec<SessionId> = {
            let sessions = self.sessions.read()?;
            sessions.iter().filter(|(_, s)| is_unhealthy(s, now, timeout)).map(|(id, _)| id.clone()).collect()
        };
        let removed = unhealthy.len();
        if removed > 0 {
            let mut sessions = self.sessions.write()?;
            for id in &unhealthy {
                sessions.remove(id);
            }
        }
        *self.last_health_check_at.lock() = Some(Timestamp::from_epoch_ms(self.clock.epoch_ms()));
        Ok(removed)
    }

    pub fn stats(&self) -> Result<PoolStats, PoolError> {
        let now = self.clock.now();
        let timeout = self.config.connection_timeout;
        let sessions = self.sessions.read()?;
        let total = sessions.len();
        let open = sessions.values().filter(|s| s.state() == SessionState::Open).count();
        let unhealthy = sessions.values().filter(|s| is_unhealthy(s, now, timeout)).count();
        Ok(PoolStats {
            total_sessions: total,
            open_sessions: open,
            inactive_sessions: total - open,
            healthy_sessions: total - unhealthy,
            unhealthy_sessions: unhealthy,
            max_connections: self.config.max_connections,
            last_health_check_at: *self.last_health_check_at.lock(),
            last_cleanup_at: *self.last_cleanup_at.lock(),
        })
    }

    /// Transition to `stopped` and close every session. One-shot: restart
    /// by constructing a new pool.
    pub async fn stop(&self) -> Result<(), PoolError> {
        self.state.store(PoolState::Stopped as u8, Ordering::SeqCst);
        let sessions: Vec<Arc<Session>> = self.sessions.write()?.drain().map(|(_, s)| s).collect();
        for session in sessions {
            let _ = session.close().await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
