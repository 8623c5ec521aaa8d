// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, timeout-bounded mutex and read-write lock. These wrap
//! `parking_lot`'s primitives (matching the rest of the workspace) and add
//! the order check, timeout, and stats/observer hooks the original's
//! `ScopedTimedLock` provided via template metaprogramming.

use crate::error::LockError;
use crate::guard::{ExclusiveLockGuard, LockGuard, SharedLockGuard};
use crate::level::{self, LockLevel};
use crate::stats::LockStatsRegistry;
use etlmon_core::observer::{default_observer, ObservedEvent, Observer};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timeout applied when callers don't specify one, matching the original's
/// 5 second default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// A mutex tagged with a [`LockLevel`]. Acquisition checks the calling
/// thread's currently-held levels before blocking, so an order violation
/// fails immediately rather than risking a deadlock.
pub struct OrderedMutex<T> {
    inner: parking_lot::Mutex<T>,
    name: String,
    level: LockLevel,
    stats: Arc<LockStatsRegistry>,
    observer: Arc<dyn Observer>,
}

impl<T> OrderedMutex<T> {
    pub fn new(name: impl Into<String>, level: LockLevel, value: T) -> Self {
        Self::with_registry(name, level, value, Arc::new(LockStatsRegistry::new()), default_observer())
    }

    pub fn with_registry(
        name: impl Into<String>,
        level: LockLevel,
        value: T,
        stats: Arc<LockStatsRegistry>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self { inner: parking_lot::Mutex::new(value), name: name.into(), level, stats, observer }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LockLevel {
        self.level
    }

    /// Acquire the lock, waiting up to `timeout`. Returns
    /// [`LockError::OrderViolation`] immediately, without attempting to
    /// lock, if this thread already holds a lock at this level or any
    /// stricter (numerically greater) level.
    pub fn lock_timeout(&self, timeout: Duration) -> Result<LockGuard<'_, T>, LockError> {
        if level::would_violate_order(self.level) {
            self.observer.observe(ObservedEvent::LockOrderViolation { name: self.name.clone() });
            return Err(LockError::OrderViolation { name: self.name.clone(), level: self.level });
        }

        let contended = self.inner.try_lock().is_none();
        let start = Instant::now();
        match self.inner.try_lock_for(timeout) {
            Some(guard) => {
                let wait = start.elapsed();
                self.stats.record_acquisition(&self.name, wait, contended);
                level::acquire(self.level);
                self.observer.observe(ObservedEvent::LockAcquired {
                    name: self.name.clone(),
                    wait_us: wait.as_micros() as u64,
                    contended,
                });
                Ok(LockGuard { inner: guard, level: self.level })
            }
            None => {
                self.stats.record_failure(&self.name);
                self.observer.observe(ObservedEvent::LockTimedOut {
                    name: self.name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                });
                Err(LockError::Timeout { name: self.name.clone(), timeout })
            }
        }
    }

    pub fn lock(&self) -> Result<LockGuard<'_, T>, LockError> {
        self.lock_timeout(DEFAULT_TIMEOUT)
    }
}

/// A reader-writer lock tagged with a [`LockLevel`], for collections that
/// are read far more often than they're mutated (e.g. the connection pool's
/// session map).
pub struct OrderedRwLock<T> {
    inner: parking_lot::RwLock<T>,
    name: String,
    level: LockLevel,
    stats: Arc<LockStatsRegistry>,
    observer: Arc<dyn Observer>,
}

impl<T> OrderedRwLock<T> {
    pub fn new(name: impl Into<String>, level: LockLevel, value: T) -> Self {
        Self::with_registry(name, level, value, Arc::new(LockStatsRegistry::new()), default_observer())
    }

    pub fn with_registry(
        name: impl Into<String>,
        level: LockLevel,
        value: T,
        stats: Arc<LockStatsRegistry>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self { inner: parking_lot::RwLock::new(value), name: name.into(), level, stats, observer }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_timeout(&self, timeout: Duration) -> Result<SharedLockGuard<'_, T>, LockError> {
        if level::would_violate_order(self.level) {
            self.observer.observe(ObservedEvent::LockOrderViolation { name: self.name.clone() });
            return Err(LockError::OrderViolation { name: self.name.clone(), level: self.level });
        }
        let contended = self.inner.try_read().is_none();
        let start = Instant::now();
        match self.inner.try_read_for(timeout) {
            Some(guard) => {
                let wait = start.elapsed();
                self.stats.record_acquisition(&self.name, wait, contended);
                level::acquire(self.level);
                self.observer.observe(ObservedEvent::LockAcquired {
                    name: self.name.clone(),
                    wait_us: wait.as_micros() as u64,
                    contended,
                });
                Ok(SharedLockGuard { inner: guard, level: self.level })
            }
            None => {
                self.stats.record_failure(&self.name);
                self.observer.observe(ObservedEvent::LockTimedOut {
                    name: self.name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                });
                Err(LockError::Timeout { name: self.name.clone(), timeout })
            }
        }
    }

    pub fn write_timeout(&self, timeout: Duration) -> Result<ExclusiveLockGuard<'_, T>, LockError> {
        if level::would_violate_order(self.level) {
            self.observer.observe(ObservedEvent::LockOrderViolation { name: self.name.clone() });
            return Err(LockError::OrderViolation { name: self.name.clone(), level: self.level });
        }
        let contended = self.inner.try_write().is_none();
        let start = Instant::now();
        match self.inner.try_write_for(timeout) {
            Some(guard) => {
                let wait = start.elapsed();
                self.stats.record_acquisition(&self.name, wait, contended);
                level::acquire(self.level);
                self.observer.observe(ObservedEvent::LockAcquired {
                    name: self.name.clone(),
                    wait_us: wait.as_micros() as u64,
                    contended,
                });
                Ok(ExclusiveLockGuard { inner: guard, level: self.level })
            }
            None => {
                self.stats.record_failure(&self.name);
                self.observer.observe(ObservedEvent::LockTimedOut {
                    name: self.name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                });
                Err(LockError::Timeout { name: self.name.clone(), timeout })
            }
        }
    }

    pub fn read(&self) -> Result<SharedLockGuard<'_, T>, LockError> {
        self.read_timeout(DEFAULT_TIMEOUT)
    }

    pub fn write(&self) -> Result<ExclusiveLockGuard<'_, T>, LockError> {
        self.write_timeout(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
