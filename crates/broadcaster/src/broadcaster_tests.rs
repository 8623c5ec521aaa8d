// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use etlmon_core::{default_observer, ConnectionFilters, FakeClock, JobId};
use etlmon_pool::PoolConfig;
use etlmon_session::{ChannelSink, CircuitBreakerConfig, SessionConfig};
use std::collections::HashSet;

fn new_session(clock: Arc<dyn Clock>, filters: ConnectionFilters) -> (Arc<Session>, tokio::sync::mpsc::Receiver<Bytes>) {
    let (sink, rx) = ChannelSink::pair(16);
    let session = Session::spawn(SessionConfig::default(), CircuitBreakerConfig::default(), clock, default_observer(), Box::new(sink));
    session.accept_handshake().unwrap();
    session.set_filters(filters);
    (session, rx)
}

fn filters_for_job(job: &str, kinds: &[MessageKind]) -> ConnectionFilters {
    let mut job_ids = HashSet::new();
    job_ids.insert(JobId::from_string(job));
    ConnectionFilters { job_ids, message_types: kinds.iter().copied().collect(), ..Default::default() }
}

#[tokio::test]
async fn fan_out_delivers_only_to_matching_sessions() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let pool = Arc::new(ConnectionPool::new(PoolConfig::default(), clock.clone(), default_observer()));
    pool.start().unwrap();

    let (session_a, mut rx_a) = new_session(clock.clone(), filters_for_job("J1", &[MessageKind::JobStatusUpdate]));
    let (session_b, mut rx_b) = new_session(clock.clone(), filters_for_job("J1", &[MessageKind::JobStatusUpdate]));
    let (session_c, mut rx_c) = new_session(clock.clone(), filters_for_job("J2", &[MessageKind::JobStatusUpdate]));
    pool.add(session_a).unwrap();
    pool.add(session_b).unwrap();
    pool.add(session_c).unwrap();

    let broadcaster = MessageBroadcaster::new(BroadcasterConfig::default(), pool, clock, default_observer());
    broadcaster
        .publish(Message::new(MessageKind::JobStatusUpdate, serde_json::json!({"s": "running"})).with_job(JobId::from_string("J1")))
        .unwrap();

    broadcaster.flush().await.unwrap();

    assert!(rx_a.try_recv().is_ok());
    assert!(rx_b.try_recv().is_ok());
    assert!(rx_c.try_recv().is_err());
    assert_eq!(broadcaster.stats().messages_sent, 2);
}

#[tokio::test]
async fn queue_overflow_drops_lowest_priority_entry() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let pool = Arc::new(ConnectionPool::new(PoolConfig::default(), clock.clone(), default_observer()));
    pool.start().unwrap();

    let mut config = BroadcasterConfig::default();
    config.max_queue_size = 3;
    let broadcaster = MessageBroadcaster::new(config, pool, clock, default_observer());

    let msg = |priority: i32| Message::new(MessageKind::SystemNotification, serde_json::json!(null)).with_priority(priority);
    broadcaster.publish(msg(5)).unwrap();
    broadcaster.publish(msg(1)).unwrap();
    broadcaster.publish(msg(5)).unwrap();
    broadcaster.publish(msg(5)).unwrap();

    let remaining: Vec<i32> = {
        let queue = broadcaster.queue.lock().unwrap();
        queue.iter().map(|e| e.priority()).collect()
    };
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|&p| p == 5));
    assert_eq!(broadcaster.stats().messages_dropped, 1);
}
