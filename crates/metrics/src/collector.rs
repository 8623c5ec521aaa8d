// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of per-job metrics plus the background publisher loop that
//! turns snapshots into `MetricsUpdate` messages for the broadcaster.

use crate::error::MetricsError;
use crate::job::{JobMetrics, MetricsSnapshot};
use async_trait::async_trait;
use etlmon_core::{Clock, JobId};
use etlmon_locking::{LockLevel, OrderedRwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default interval between published snapshots (§4.6).
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(5);

/// Receives a job's metrics snapshot on every publish tick. The broadcaster
/// crate implements this to route snapshots into its fan-out queue as
/// `MetricsUpdate` messages.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    async fn publish(&self, job_id: &JobId, snapshot: MetricsSnapshot);
}

/// Owns one [`JobMetrics`] per job id and the handles for any publisher
/// tasks spawned against them.
pub struct MetricsCollector {
    clock: Arc<dyn Clock>,
    jobs: OrderedRwLock<HashMap<JobId, Arc<JobMetrics>>>,
    publishers: parking_lot::Mutex<HashMap<JobId, (JoinHandle<()>, CancellationToken)>>,
}

impl MetricsCollector {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            jobs: OrderedRwLock::new("metrics.jobs", LockLevel::Container, HashMap::new()),
            publishers: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the metrics handle for `job_id`.
    pub fn metrics_for(&self, job_id: &JobId) -> Result<Arc<JobMetrics>, MetricsError> {
        if let Some(existing) = self.jobs.read()?.get(job_id) {
            return Ok(existing.clone());
        }
        let mut jobs = self.jobs.write()?;
        Ok(jobs.entry(job_id.clone()).or_insert_with(|| JobMetrics::new(self.clock.as_ref())).clone())
    }

    pub fn snapshot(&self, job_id: &JobId) -> Result<Option<MetricsSnapshot>, MetricsError> {
        let jobs = self.jobs.read()?;
        Ok(jobs.get(job_id).map(|m| m.snapshot(self.clock.as_ref())))
    }

    pub fn remove(&self, job_id: &JobId) -> Result<(), MetricsError> {
        self.jobs.write()?.remove(job_id);
        self.stop_publisher(job_id);
        Ok(())
    }

    pub fn job_ids(&self) -> Result<Vec<JobId>, MetricsError> {
        Ok(self.jobs.read()?.keys().cloned().collect())
    }

    /// Start a background task that snapshots and publishes `job_id`'s
    /// metrics every `interval` until [`Self::stop_publisher`] is called or
    /// the collector is dropped. Replaces any existing publisher for the
    /// same job.
    pub fn spawn_publisher(
        self: &Arc<Self>,
        job_id: JobId,
        interval: Duration,
        publisher: Arc<dyn MetricsPublisher>,
    ) {
        self.stop_publisher(&job_id);

        let token = CancellationToken::new();
        let child_token = token.clone();
        let collector = self.clone();
        let task_job_id = job_id.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = child_token.cancelled() => break,
                    _ = ticker.tick() => {
                        match collector.snapshot(&task_job_id) {
                            Ok(Some(snapshot)) => publisher.publish(&task_job_id, snapshot).await,
                            Ok(None) => break,
                            Err(err) => {
                                tracing::warn!(job_id = %task_job_id, error = %err, "metrics snapshot failed");
                            }
                        }
                    }
                }
            }
        });

        self.publishers.lock().insert(job_id, (handle, token));
    }

    pub fn stop_publisher(&self, job_id: &JobId) {
        if let Some((handle, token)) = self.publishers.lock().remove(job_id) {
            token.cancel();
            handle.abort();
        }
    }

    pub fn stop_all_publishers(&self) {
        for (_, (handle, token)) in self.publishers.lock().drain() {
            token.cancel();
            handle.abort();
        }
    }
}

impl Drop for MetricsCollector {
    fn drop(&mut self) {
        self.stop_all_publishers();
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
