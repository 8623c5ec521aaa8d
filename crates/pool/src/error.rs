// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use etlmon_locking::LockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("pool is at capacity ({max})")]
    CapacityExceeded { max: usize },
    #[error("pool is not running")]
    NotRunning,
}
