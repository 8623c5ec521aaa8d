// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use etlmon_core::FakeClock;

fn state_with(config: SessionConfig) -> RecoveryState {
    RecoveryState::new(config, Arc::new(FakeClock::new()))
}

#[test]
fn backoff_delay_follows_exponential_formula_with_cap() {
    let base = Duration::from_millis(1000);
    let max = Duration::from_millis(30_000);
    assert_eq!(backoff_delay(1, base, 2.0, max), base);
    assert_eq!(backoff_delay(2, base, 2.0, max), Duration::from_millis(2000));
    assert_eq!(backoff_delay(3, base, 2.0, max), Duration::from_millis(4000));
    assert_eq!(backoff_delay(6, base, 2.0, max), max);
}

#[test]
fn next_backoff_is_none_once_attempts_exhausted() {
    let mut config = SessionConfig::default();
    config.max_reconnect_attempts = 2;
    let state = state_with(config);
    assert!(state.next_backoff().is_some());
    assert!(state.next_backoff().is_some());
    assert!(state.next_backoff().is_none());
}

#[test]
fn pending_buffer_drops_oldest_on_overflow() {
    let mut config = SessionConfig::default();
    config.message_queue_max_size = 2;
    let state = state_with(config);
    state.buffer_pending(Bytes::from_static(b"F1"));
    state.buffer_pending(Bytes::from_static(b"F2"));
    state.buffer_pending(Bytes::from_static(b"F3"));
    assert_eq!(state.pending_len(), 2);
    let flushed = state.flush_pending();
    assert_eq!(flushed, vec![Bytes::from_static(b"F2"), Bytes::from_static(b"F3")]);
}

#[test]
fn flush_pending_preserves_fifo_order() {
    let state = state_with(SessionConfig::default());
    state.buffer_pending(Bytes::from_static(b"F1"));
    state.buffer_pending(Bytes::from_static(b"F2"));
    state.buffer_pending(Bytes::from_static(b"F3"));
    assert_eq!(
        state.flush_pending(),
        vec![Bytes::from_static(b"F1"), Bytes::from_static(b"F2"), Bytes::from_static(b"F3")]
    );
    assert_eq!(state.pending_len(), 0);
}

#[test]
fn missed_heartbeat_trips_at_threshold() {
    let mut config = SessionConfig::default();
    config.max_missed_heartbeats = 3;
    let state = state_with(config);
    assert!(!state.note_missed_heartbeat());
    assert!(!state.note_missed_heartbeat());
    assert!(state.note_missed_heartbeat());
}

#[test]
fn on_reconnected_resets_attempts_and_recovery_flag() {
    let state = state_with(SessionConfig::default());
    state.enter_recovery();
    state.next_backoff();
    state.note_missed_heartbeat();
    state.on_reconnected();
    assert!(!state.is_recovering());
    assert_eq!(state.reconnect_attempts(), 0);
    assert_eq!(state.missed_heartbeats(), 0);
}
