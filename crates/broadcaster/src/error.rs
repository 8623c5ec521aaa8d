// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use etlmon_locking::LockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcasterError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Pool(#[from] etlmon_pool::PoolError),
    #[error("session {session_id} not found")]
    SessionNotFound { session_id: String },
    #[error("session {session_id} is closed")]
    SessionClosed { session_id: String },
}
