// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::level::LockLevel;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock '{name}' not acquired within {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    #[error(
        "lock order violation acquiring '{name}' at level {level}: a lock at the same or coarser level is already held on this thread"
    )]
    OrderViolation { name: String, level: LockLevel },
}
