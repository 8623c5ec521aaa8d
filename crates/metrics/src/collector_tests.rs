// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use etlmon_core::FakeClock;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration as StdDuration;

struct CountingPublisher {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MetricsPublisher for CountingPublisher {
    async fn publish(&self, _job_id: &JobId, _snapshot: MetricsSnapshot) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

#[test]
fn metrics_for_creates_once_and_reuses() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let collector = MetricsCollector::new(clock);
    let job = JobId::from_string("J1");
    let a = collector.metrics_for(&job).unwrap();
    let b = collector.metrics_for(&job).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn remove_drops_job_and_its_publisher() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let collector = MetricsCollector::new(clock);
    let job = JobId::from_string("J1");
    collector.metrics_for(&job).unwrap();
    collector.remove(&job).unwrap();
    assert!(collector.snapshot(&job).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn spawn_publisher_publishes_on_each_tick() {
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
    let collector = Arc::new(MetricsCollector::new(clock));
    let job = JobId::from_string("J1");
    collector.metrics_for(&job).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let publisher = Arc::new(CountingPublisher { calls: calls.clone() });
    collector.spawn_publisher(job.clone(), StdDuration::from_millis(10), publisher);

    tokio::time::advance(StdDuration::from_millis(35)).await;
    tokio::task::yield_now().await;

    assert!(calls.load(AtomicOrdering::SeqCst) >= 2);
    collector.stop_publisher(&job);
}
