// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use etlmon_core::test_support::RecordingObserver;
use std::thread;

#[test]
fn lock_and_unlock_round_trips_value() {
    let m = OrderedMutex::new("m", LockLevel::Resource, 0);
    {
        let mut guard = m.lock().unwrap();
        *guard += 1;
    }
    assert_eq!(*m.lock().unwrap(), 1);
}

#[test]
fn ascending_level_acquisition_across_two_locks_succeeds() {
    let config = OrderedMutex::new("config", LockLevel::Config, ());
    let state = OrderedMutex::new("state", LockLevel::State, ());
    let _g1 = config.lock().unwrap();
    let _g2 = state.lock().unwrap();
}

#[test]
fn descending_level_acquisition_is_rejected_without_blocking() {
    let state = OrderedMutex::new("state", LockLevel::State, ());
    let config = OrderedMutex::new("config", LockLevel::Config, ());
    let _g1 = state.lock().unwrap();
    let err = config.lock_timeout(Duration::from_millis(10)).unwrap_err();
    assert!(matches!(err, LockError::OrderViolation { .. }));
}

#[test]
fn order_violation_is_reported_to_observer() {
    let observer = RecordingObserver::new();
    let state = OrderedMutex::with_registry(
        "state",
        LockLevel::State,
        (),
        Arc::new(LockStatsRegistry::new()),
        observer.clone(),
    );
    let config = OrderedMutex::with_registry(
        "config",
        LockLevel::Config,
        (),
        Arc::new(LockStatsRegistry::new()),
        observer.clone(),
    );
    let _g1 = state.lock().unwrap();
    let _ = config.lock_timeout(Duration::from_millis(10));
    assert_eq!(
        observer.count(|e| matches!(e, ObservedEvent::LockOrderViolation { .. })),
        1
    );
}

#[test]
fn timeout_elapses_when_another_thread_holds_the_lock() {
    let m = Arc::new(OrderedMutex::new("m", LockLevel::Resource, ()));
    let m2 = m.clone();
    let guard = m.lock().unwrap();
    let handle = thread::spawn(move || m2.lock_timeout(Duration::from_millis(20)).is_err());
    assert!(handle.join().unwrap());
    drop(guard);
}

#[test]
fn rwlock_allows_concurrent_reads() {
    let rw = OrderedRwLock::new("rw", LockLevel::Container, 5);
    let r1 = rw.read().unwrap();
    let r2 = rw.read().unwrap();
    assert_eq!(*r1, 5);
    assert_eq!(*r2, 5);
}

#[test]
fn rwlock_write_excludes_reads() {
    let rw = Arc::new(OrderedRwLock::new("rw", LockLevel::Container, 5));
    let rw2 = rw.clone();
    let _w = rw.write().unwrap();
    let handle = thread::spawn(move || rw2.read_timeout(Duration::from_millis(20)).is_err());
    assert!(handle.join().unwrap());
}

#[test]
fn stats_registry_tracks_acquisitions_per_lock() {
    let stats = Arc::new(LockStatsRegistry::new());
    let m = OrderedMutex::with_registry(
        "tracked",
        LockLevel::Resource,
        (),
        stats.clone(),
        etlmon_core::default_observer(),
    );
    let _g = m.lock().unwrap();
    drop(_g);
    let _g2 = m.lock().unwrap();
    assert_eq!(stats.get("tracked").acquisitions, 2);
}
