// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::level::{self, LockLevel};
use std::ops::{Deref, DerefMut};

/// RAII guard for an exclusive [`crate::OrderedMutex`] acquisition. Releases
/// the thread-local held-level accounting when dropped, in addition to the
/// underlying `parking_lot` guard.
pub struct LockGuard<'a, T> {
    pub(crate) inner: parking_lot::MutexGuard<'a, T>,
    pub(crate) level: LockLevel,
}

impl<'a, T> Deref for LockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<'a, T> DerefMut for LockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<'a, T> Drop for LockGuard<'a, T> {
    fn drop(&mut self) {
        level::release(self.level);
    }
}

/// RAII guard for a shared [`crate::OrderedRwLock`] read acquisition.
pub struct SharedLockGuard<'a, T> {
    pub(crate) inner: parking_lot::RwLockReadGuard<'a, T>,
    pub(crate) level: LockLevel,
}

impl<'a, T> Deref for SharedLockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<'a, T> Drop for SharedLockGuard<'a, T> {
    fn drop(&mut self) {
        level::release(self.level);
    }
}

/// RAII guard for an exclusive [`crate::OrderedRwLock`] write acquisition.
pub struct ExclusiveLockGuard<'a, T> {
    pub(crate) inner: parking_lot::RwLockWriteGuard<'a, T>,
    pub(crate) level: LockLevel,
}

impl<'a, T> Deref for ExclusiveLockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<'a, T> DerefMut for ExclusiveLockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<'a, T> Drop for ExclusiveLockGuard<'a, T> {
    fn drop(&mut self) {
        level::release(self.level);
    }
}
