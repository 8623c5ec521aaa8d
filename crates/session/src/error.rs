// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use etlmon_locking::LockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("circuit breaker is open for session {session_id}")]
    CircuitOpen { session_id: String },
    #[error("session {session_id} is closed")]
    Closed { session_id: String },
    #[error("sink error: {0}")]
    Sink(String),
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: crate::session::SessionState, to: crate::session::SessionState },
}
