// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sink::ChannelSink;
use etlmon_core::{default_observer, FakeClock};

fn open_session(config: SessionConfig) -> (Arc<Session>, tokio::sync::mpsc::Receiver<Bytes>) {
    let (sink, rx) = ChannelSink::pair(8);
    let clock = Arc::new(FakeClock::new());
    let session = Session::spawn(config, CircuitBreakerConfig::default(), clock, default_observer(), Box::new(sink));
    session.accept_handshake().unwrap();
    (session, rx)
}

#[tokio::test]
async fn handshake_then_close_transitions_correctly() {
    let (session, _rx) = open_session(SessionConfig::default());
    assert_eq!(session.state(), SessionState::Open);
    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn enqueue_after_close_is_rejected() {
    let (session, _rx) = open_session(SessionConfig::default());
    session.close().await.unwrap();
    let err = session.enqueue_frame(Bytes::from_static(b"x")).unwrap_err();
    assert!(matches!(err, SessionError::Closed { .. }));
}

#[tokio::test]
async fn live_frames_are_delivered_through_the_sink() {
    let (session, mut rx) = open_session(SessionConfig::default());
    session.enqueue_frame(Bytes::from_static(b"hello")).unwrap();
    assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"hello"));
}

#[tokio::test]
async fn missed_heartbeats_reaching_threshold_enters_recovery() {
    let mut config = SessionConfig::default();
    config.max_missed_heartbeats = 2;
    let (session, _rx) = open_session(config);

    session.tick_heartbeat().unwrap();
    assert_eq!(session.state(), SessionState::Open);
    session.tick_heartbeat().unwrap();
    assert_eq!(session.state(), SessionState::Recovering);
}

#[tokio::test]
async fn frames_enqueued_while_recovering_go_to_pending_buffer() {
    let mut config = SessionConfig::default();
    config.max_missed_heartbeats = 1;
    let (session, _rx) = open_session(config);
    session.tick_heartbeat().unwrap();
    assert_eq!(session.state(), SessionState::Recovering);

    session.enqueue_frame(Bytes::from_static(b"buffered")).unwrap();
    assert_eq!(session.pending_len(), 1);
    assert_eq!(session.send_queue_len(), 0);
}

#[tokio::test]
async fn reconnect_flushes_pending_frames_in_fifo_order_before_new_frames() {
    let mut config = SessionConfig::default();
    config.message_queue_max_size = 5;
    let (session, _rx_a) = open_session(config);
    session.enter_recovery().unwrap();

    session.enqueue_frame(Bytes::from_static(b"F1")).unwrap();
    session.enqueue_frame(Bytes::from_static(b"F2")).unwrap();
    session.enqueue_frame(Bytes::from_static(b"F3")).unwrap();
    assert_eq!(session.pending_len(), 3);

    let (sink_b, mut rx_b) = ChannelSink::pair(8);
    session.reconnect(Box::new(sink_b)).await.unwrap();
    assert_eq!(session.pending_len(), 0);
    assert_eq!(session.state(), SessionState::Open);

    session.enqueue_frame(Bytes::from_static(b"live")).unwrap();

    assert_eq!(rx_b.recv().await.unwrap(), Bytes::from_static(b"F1"));
    assert_eq!(rx_b.recv().await.unwrap(), Bytes::from_static(b"F2"));
    assert_eq!(rx_b.recv().await.unwrap(), Bytes::from_static(b"F3"));
    assert_eq!(rx_b.recv().await.unwrap(), Bytes::from_static(b"live"));
}
