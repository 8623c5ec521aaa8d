// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background heartbeat ticker. Reading the actual socket for liveness
//! evidence is out of scope (§1); this task only enforces the timing
//! contract described in §4.5 and relies on an external caller to invoke
//! [`Session::note_heartbeat`] when evidence of liveness is observed.

use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a task that ticks `session.tick_heartbeat()` every `interval`
/// until the session closes.
pub fn spawn_heartbeat(session: Arc<Session>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if session.state() == crate::session::SessionState::Closed {
                break;
            }
            if let Err(err) = session.tick_heartbeat() {
                // Already recovering (or handshaking): nothing to do until
                // the session is open again.
                tracing::trace!(session = %session.id(), error = %err, "heartbeat tick was a no-op");
            }
        }
    })
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
