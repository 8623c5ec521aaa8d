// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job lock-free counters and the derived-metric snapshot built from
//! them, grounded on `original_source/include/system_metrics.hpp`'s
//! `JobMetricsCollector`.

use etlmon_core::{Clock, Timestamp};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Reference scale a job is considered "fully efficient" against, used to
/// normalize `memory_efficiency` into `[0, 1]` before averaging into
/// `overall_efficiency`. Records-per-MB above this is clamped to 1.0.
const MEMORY_EFFICIENCY_REFERENCE: f64 = 10.0;

/// Reference scale for `cpu_efficiency` (records processed per CPU percent
/// point consumed).
const CPU_EFFICIENCY_REFERENCE: f64 = 1.0;

/// Reference scale for `throughput_mbps`.
const THROUGHPUT_REFERENCE_MBPS: f64 = 5.0;

#[derive(Debug, Default)]
struct Timestamps {
    start: Option<Timestamp>,
    first_error: Option<Timestamp>,
    last_update: Option<Timestamp>,
}

/// Lock-free counters for a single job, updated from worker threads without
/// any mutex on the hot path. Only the rarely-touched timestamps (start,
/// first-error, last-update) live behind a short-held mutex.
pub struct JobMetrics {
    records_processed: AtomicU64,
    records_successful: AtomicU64,
    records_failed: AtomicU64,
    batches: AtomicU64,
    bytes_processed: AtomicU64,
    memory_mb: AtomicU64,
    /// Stored as milli-percent (`pct * 1000`) so it can live in an
    /// `AtomicU64` without a floating-point atomic.
    cpu_pct_milli: AtomicU64,
    timestamps: Mutex<Timestamps>,
}

impl JobMetrics {
    pub fn new(clock: &dyn Clock) -> Arc<Self> {
        Arc::new(Self {
            records_processed: AtomicU64::new(0),
            records_successful: AtomicU64::new(0),
            records_failed: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            memory_mb: AtomicU64::new(0),
            cpu_pct_milli: AtomicU64::new(0),
            timestamps: Mutex::new(Timestamps {
                start: Some(Timestamp::from_epoch_ms(clock.epoch_ms())),
                first_error: None,
                last_update: Some(Timestamp::from_epoch_ms(clock.epoch_ms())),
            }),
        })
    }

    pub fn record_processed(&self, clock: &dyn Clock) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
        self.touch(clock);
    }

    pub fn record_successful(&self, clock: &dyn Clock) {
        self.records_successful.fetch_add(1, Ordering::Relaxed);
        self.touch(clock);
    }

    pub fn record_failed(&self, clock: &dyn Clock) {
        let previous = self.records_failed.fetch_add(1, Ordering::Relaxed);
        if previous == 0 {
            let mut ts = self.timestamps.lock();
            if ts.first_error.is_none() {
                ts.first_error = Some(Timestamp::from_epoch_ms(clock.epoch_ms()));
            }
        }
        self.touch(clock);
    }

    pub fn record_batch(&self, size: u64, successful: u64, failed: u64, bytes: u64, clock: &dyn Clock) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.records_processed.fetch_add(size, Ordering::Relaxed);
        self.records_successful.fetch_add(successful, Ordering::Relaxed);
        self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
        if failed > 0 {
            let previous = self.records_failed.fetch_add(failed, Ordering::Relaxed);
            if previous == 0 {
                let mut ts = self.timestamps.lock();
                if ts.first_error.is_none() {
                    ts.first_error = Some(Timestamp::from_epoch_ms(clock.epoch_ms()));
                }
            }
        }
        self.touch(clock);
    }

    pub fn set_resource_usage(&self, memory_mb: u64, cpu_pct: f64) {
        self.memory_mb.store(memory_mb, Ordering::Relaxed);
        self.cpu_pct_milli.store((cpu_pct * 1000.0).round() as u64, Ordering::Relaxed);
    }

    fn touch(&self, clock: &dyn Clock) {
        self.timestamps.lock().last_update = Some(Timestamp::from_epoch_ms(clock.epoch_ms()));
    }

    /// Build an immutable, consistent-at-a-point-in-time snapshot with all
    /// derived fields from §4.6 computed.
    pub fn snapshot(&self, clock: &dyn Clock) -> MetricsSnapshot {
        let processed = self.records_processed.load(Ordering::Relaxed);
        let successful = self.records_successful.load(Ordering::Relaxed);
        let failed = self.records_failed.load(Ordering::Relaxed);
        let batches = self.batches.load(Ordering::Relaxed);
        let bytes = self.bytes_processed.load(Ordering::Relaxed);
        let memory_mb = self.memory_mb.load(Ordering::Relaxed);
        let cpu_pct = self.cpu_pct_milli.load(Ordering::Relaxed) as f64 / 1000.0;

        let ts = self.timestamps.lock();
        let start = ts.start.unwrap_or_else(|| Timestamp::from_epoch_ms(clock.epoch_ms()));
        let first_error = ts.first_error;
        let last_update = ts.last_update.unwrap_or(start);
        drop(ts);

        let elapsed_secs = ((clock.epoch_ms().saturating_sub(start.epoch_ms())) as f64 / 1000.0).max(0.0);

        let processing_rate = if elapsed_secs > 0.0 { processed as f64 / elapsed_secs } else { 0.0 };
        let error_rate = if processed > 0 { (failed as f64 / processed as f64) * 100.0 } else { 0.0 };
        let throughput_mbps = if elapsed_secs > 0.0 {
            bytes as f64 / (elapsed_secs * 1024.0 * 1024.0)
        } else {
            0.0
        };
        let memory_efficiency = if memory_mb > 0 { processed as f64 / memory_mb as f64 } else { 0.0 };
        let cpu_efficiency = if cpu_pct > 0.0 { processed as f64 / cpu_pct } else { 0.0 };

        let normalize = |value: f64, reference: f64| (value / reference).clamp(0.0, 1.0);
        let overall_efficiency = (normalize(memory_efficiency, MEMORY_EFFICIENCY_REFERENCE)
            + normalize(cpu_efficiency, CPU_EFFICIENCY_REFERENCE)
            + normalize(throughput_mbps, THROUGHPUT_REFERENCE_MBPS))
            / 3.0;

        MetricsSnapshot {
            records_processed: processed,
            records_successful: successful,
            records_failed: failed,
            batches,
            bytes_processed: bytes,
            memory_mb,
            cpu_pct,
            processing_rate,
            error_rate,
            throughput_mbps,
            memory_efficiency,
            cpu_efficiency,
            overall_efficiency,
            time_to_first_error: first_error,
            start,
            last_update,
            taken_at: Timestamp::from_epoch_ms(clock.epoch_ms()),
        }
    }
}

/// Immutable point-in-time view of a job's metrics, including every
/// derived field from §4.6.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub records_processed: u64,
    pub records_successful: u64,
    pub records_failed: u64,
    pub batches: u64,
    pub bytes_processed: u64,
    pub memory_mb: u64,
    pub cpu_pct: f64,
    pub processing_rate: f64,
    pub error_rate: f64,
    pub throughput_mbps: f64,
    pub memory_efficiency: f64,
    pub cpu_efficiency: f64,
    pub overall_efficiency: f64,
    pub time_to_first_error: Option<Timestamp>,
    pub start: Timestamp,
    pub last_update: Timestamp,
    pub taken_at: Timestamp,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
