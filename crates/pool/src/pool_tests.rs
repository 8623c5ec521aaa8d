// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use etlmon_core::{default_observer, FakeClock};
use etlmon_session::{ChannelSink, CircuitBreakerConfig, SessionConfig};
use std::time::Duration;

fn new_session(clock: Arc<dyn Clock>) -> Arc<Session> {
    let (sink, _rx) = ChannelSink::pair(8);
    let session = Session::spawn(SessionConfig::default(), CircuitBreakerConfig::default(), clock, default_observer(), Box::new(sink));
    session.accept_handshake().unwrap();
    session
}

fn running_pool(config: PoolConfig, clock: Arc<FakeClock>) -> ConnectionPool {
    let pool = ConnectionPool::new(config, clock, default_observer());
    pool.start().unwrap();
    pool
}

#[test]
fn add_then_get_round_trips_a_session() {
    let clock = Arc::new(FakeClock::new());
    let pool = running_pool(PoolConfig::default(), clock.clone());
    let session = new_session(clock);
    let id = session.id().clone();
    pool.add(session).unwrap();
    assert!(pool.has(&id).unwrap());
    assert!(pool.get(&id).unwrap().is_some());
}

#[test]
fn add_before_start_fails_with_not_running() {
    let clock = Arc::new(FakeClock::new());
    let pool = ConnectionPool::new(PoolConfig::default(), clock.clone(), default_observer());
    let session = new_session(clock);
    assert!(matches!(pool.add(session), Err(PoolError::NotRunning)));
}

#[test]
fn add_past_capacity_is_rejected() {
    let clock = Arc::new(FakeClock::new());
    let mut config = PoolConfig::default();
    config.max_connections = 1;
    let pool = running_pool(config, clock.clone());
    pool.add(new_session(clock.clone())).unwrap();
    let err = pool.add(new_session(clock)).unwrap_err();
    assert!(matches!(err, PoolError::CapacityExceeded { max: 1 }));
}

#[test]
fn remove_is_idempotent() {
    let clock = Arc::new(FakeClock::new());
    let pool = running_pool(PoolConfig::default(), clock.clone());
    let session = new_session(clock);
    let id = session.id().clone();
    pool.add(session).unwrap();
    pool.remove(&id).unwrap();
    pool.remove(&id).unwrap();
    assert!(!pool.has(&id).unwrap());
}

#[test]
fn active_sessions_only_includes_open_sessions() {
    let clock = Arc::new(FakeClock::new());
    let pool = running_pool(PoolConfig::default(), clock.clone());
    let open = new_session(clock.clone());
    pool.add(open.clone()).unwrap();
    assert_eq!(pool.active_sessions().unwrap().len(), 1);
    open.enter_recovery().unwrap();
    assert_eq!(pool.active_sessions().unwrap().len(), 0);
}

#[test]
fn cleanup_stale_removes_non_open_sessions_up_to_batch_size() {
    let clock = Arc::new(FakeClock::new());
    let mut config = PoolConfig::default();
    config.cleanup_batch_size = 1;
    let pool = running_pool(config, clock.clone());
    let a = new_session(clock.clone());
    let b = new_session(clock.clone());
    pool.add(a.clone()).unwrap();
    pool.add(b.clone()).unwrap();
    a.enter_recovery().unwrap();
    b.enter_recovery().unwrap();

    let removed = pool.cleanup_stale().unwrap();
    assert_eq!(removed, 1);
    assert_eq!(pool.len().unwrap(), 1);
}

#[test]
fn perform_health_check_removes_sessions_past_the_timeout() {
    let clock = Arc::new(FakeClock::new());
    let mut config = PoolConfig::default();
    config.connection_timeout = Duration::from_secs(30);
    let pool = running_pool(config, clock.clone());
    let session = new_session(clock.clone());
    session.note_heartbeat();
    pool.add(session).unwrap();

    assert_eq!(pool.perform_health_check().unwrap(), 0);
    clock.advance(Duration::from_secs(31));
    assert_eq!(pool.perform_health_check().unwrap(), 1);
    assert_eq!(pool.len().unwrap(), 0);
}

#[test]
fn stats_reports_health_counts_and_last_run_timestamps() {
    let clock = Arc::new(FakeClock::new());
    let pool = running_pool(PoolConfig::default(), clock.clone());

    let healthy = new_session(clock.clone());
    healthy.note_heartbeat();
    pool.add(healthy).unwrap();
    let recovering = new_session(clock.clone());
    recovering.enter_recovery().unwrap();
    pool.add(recovering).unwrap();

    let stats = pool.stats().unwrap();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.open_sessions, 1);
    assert_eq!(stats.inactive_sessions, 1);
    assert_eq!(stats.healthy_sessions, 1);
    assert_eq!(stats.unhealthy_sessions, 1);
    assert!(stats.last_health_check_at.is_none());
    assert!(stats.last_cleanup_at.is_none());

    assert_eq!(pool.perform_health_check().unwrap(), 1);
    pool.cleanup_stale().unwrap();

    let stats = pool.stats().unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.healthy_sessions, 1);
    assert_eq!(stats.unhealthy_sessions, 0);
    assert!(stats.last_health_check_at.is_some());
    assert!(stats.last_cleanup_at.is_some());
}

#[tokio::test]
async fn stop_closes_every_session() {
    let clock = Arc::new(FakeClock::new());
    let pool = running_pool(PoolConfig::default(), clock.clone());
    let session = new_session(clock);
    let id = session.id().clone();
    pool.add(session.clone()).unwrap();

    pool.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!pool.has(&id).unwrap());
}
