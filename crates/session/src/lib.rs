// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! etlmon-session: one WebSocket session's lifecycle — filtered send,
//! ordered delivery, heartbeat, circuit breaking, and reconnection-backoff
//! state. The socket itself (the HTTP/WebSocket-upgrade façade) is out of
//! scope — sessions drive a [`FrameSink`] instead.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod circuit_breaker;
mod config;
mod error;
mod heartbeat;
mod queue;
mod recovery;
mod session;
mod sink;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use config::{CircuitBreakerConfig, SessionConfig};
pub use error::SessionError;
pub use heartbeat::spawn_heartbeat;
pub use queue::SendQueue;
pub use recovery::{backoff_delay, RecoveryState};
pub use session::{Session, SessionState};
pub use sink::{ChannelSink, FrameSink};
