// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged, TTL'd in-memory cache with bounded warmup, grounded on
//! `original_source/include/cache_manager.hpp` and
//! `original_source/src/cache_manager.cpp`.

use crate::backend::{AlwaysHealthy, CacheBackend};
use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::stats::{CacheStats, CacheStatsSnapshot};
use crate::warmup::{WarmupKey, WarmupReport, WarmupSource};
use etlmon_core::{Clock, ObservedEvent, Observer};
use etlmon_locking::{LockLevel, OrderedRwLock};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tag_index: HashMap<String, HashSet<String>>,
}

struct HealthCache {
    checked_at: Option<Instant>,
    healthy: bool,
}

/// The `user`/`job`/`session`/`health` cache façades the original exposed
/// as separate `cache{User,Job,Session}Data` methods are implemented here as
/// thin wrappers over the generic, tag-aware `put`/`get`.
pub struct CacheManager {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    backend: Arc<dyn CacheBackend>,
    state: OrderedRwLock<CacheState>,
    stats: CacheStats,
    health: Mutex<HealthCache>,
}

impl CacheManager {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>, observer: Arc<dyn Observer>) -> Self {
        Self::with_backend(config, clock, observer, Arc::new(AlwaysHealthy))
    }

    pub fn with_backend(
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        Self {
            config,
            clock,
            observer,
            backend,
            state: OrderedRwLock::new("cache.state", LockLevel::Container, CacheState::default()),
            stats: CacheStats::default(),
            health: Mutex::new(HealthCache { checked_at: None, healthy: true }),
        }
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.config.cache_prefix, key)
    }

    /// TTL-by-tag selection (§4.4): `user` → `user_ttl`, `job` → `job_ttl`,
    /// `session` → `session_ttl`, else `default_ttl`. The first matching
    /// tag wins when more than one is present.
    pub fn ttl_for_tags(&self, tags: &[impl AsRef<str>]) -> Duration {
        for tag in tags {
            match tag.as_ref() {
                "user" => return self.config.user_ttl,
                "job" => return self.config.job_ttl,
                "session" => return self.config.session_ttl,
                _ => continue,
            }
        }
        self.config.default_ttl
    }

    pub fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        tags: &[impl AsRef<str>],
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        if !self.config.enabled {
            return Ok(());
        }
        let full_key = self.make_key(key);
        let ttl = ttl.unwrap_or_else(|| self.ttl_for_tags(tags));
        let tag_vec: SmallVec<[String; 2]> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        let expires_at = self.clock.now() + ttl;

        let mut state = self.state.write()?;
        if state.entries.len() >= self.config.max_cache_size && !state.entries.contains_key(&full_key) {
            self.stats.record_error();
            return Ok(());
        }
        for tag in &tag_vec {
            state.tag_index.entry(tag.clone()).or_default().insert(full_key.clone());
        }
        state.entries.insert(full_key, CacheEntry { value, tags: tag_vec, expires_at });
        drop(state);

        self.stats.record_set();
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let full_key = self.make_key(key);
        let now = self.clock.now();

        {
            let state = self.state.read()?;
            if let Some(entry) = state.entries.get(&full_key) {
                if !entry.is_expired(now) {
                    self.stats.record_hit();
                    return Ok(Some(entry.value.clone()));
                }
            } else {
                self.stats.record_miss();
                return Ok(None);
            }
        }

        // Expired: remove it, counted as a miss.
        self.remove_entry(&full_key)?;
        self.stats.record_miss();
        Ok(None)
    }

    pub fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let full_key = self.make_key(key);
        let removed = self.remove_entry(&full_key)?;
        if removed {
            self.stats.record_delete();
        }
        Ok(removed)
    }

    fn remove_entry(&self, full_key: &str) -> Result<bool, CacheError> {
        let mut state = self.state.write()?;
        let Some(entry) = state.entries.remove(full_key) else {
            return Ok(false);
        };
        for tag in &entry.tags {
            if let Some(keys) = state.tag_index.get_mut(tag.as_str()) {
                keys.remove(full_key);
                if keys.is_empty() {
                    state.tag_index.remove(tag.as_str());
                }
            }
        }
        Ok(true)
    }

    pub fn invalidate_by_tag(&self, tag: &str) -> Result<usize, CacheError> {
        self.invalidate_by_tags(&[tag])
    }

    pub fn invalidate_by_tags(&self, tags: &[impl AsRef<str>]) -> Result<usize, CacheError> {
        let keys: HashSet<String> = {
            let state = self.state.read()?;
            tags.iter()
                .filter_map(|t| state.tag_index.get(t.as_ref()))
                .flat_map(|keys| keys.iter().cloned())
                .collect()
        };
        let mut removed = 0;
        for key in &keys {
            if self.remove_entry(key)? {
                removed += 1;
            }
        }
        if removed > 0 {
            self.stats.record_delete();
        }
        Ok(removed)
    }

    pub fn clear_all(&self) -> Result<(), CacheError> {
        let mut state = self.state.write()?;
        state.entries.clear();
        state.tag_index.clear();
        Ok(())
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_user_data(&self, user_id: &str, data: serde_json::Value) -> Result<(), CacheError> {
        self.put(&format!("user:{user_id}"), data, &["user"], None)
    }

    pub fn cached_user_data(&self, user_id: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.get(&format!("user:{user_id}"))
    }

    pub fn invalidate_user_data(&self, user_id: &str) -> Result<bool, CacheError> {
        self.invalidate(&format!("user:{user_id}"))
    }

    pub fn cache_job_data(&self, job_id: &str, data: serde_json::Value) -> Result<(), CacheError> {
        self.put(&format!("job:{job_id}"), data, &["job"], None)
    }

    pub fn cached_job_data(&self, job_id: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.get(&format!("job:{job_id}"))
    }

    pub fn invalidate_job_data(&self, job_id: &str) -> Result<bool, CacheError> {
        self.invalidate(&format!("job:{job_id}"))
    }

    pub fn invalidate_all_job_data(&self) -> Result<usize, CacheError> {
        self.invalidate_by_tag("job")
    }

    pub fn cache_session_data(&self, session_id: &str, data: serde_json::Value) -> Result<(), CacheError> {
        self.put(&format!("session:{session_id}"), data, &["session"], None)
    }

    pub fn cached_session_data(&self, session_id: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.get(&format!("session:{session_id}"))
    }

    pub fn invalidate_session_data(&self, session_id: &str) -> Result<bool, CacheError> {
        self.invalidate(&format!("session:{session_id}"))
    }

    /// Pings the backend at most once per `health_check_ttl`, returning the
    /// cached result otherwise — mirrors the original's coalesced health
    /// check so a noisy caller can't flood the backend with pings.
    pub async fn is_healthy(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let now = self.clock.now();
        {
            let cached = self.health.lock();
            if let Some(checked_at) = cached.checked_at {
                if now.duration_since(checked_at) < self.config.health_check_ttl {
                    return cached.healthy;
                }
            }
        }
        let healthy = self.backend.ping().await;
        let mut cached = self.health.lock();
        cached.checked_at = Some(now);
        cached.healthy = healthy;
        healthy
    }

    /// Bounded, batched warmup (§4.4). Fetches candidate keys from `source`,
    /// then dispatches each batch of `warmup_batch_size` as its own detached
    /// task, bounded individually by `warmup_batch_timeout`. Dispatch stops,
    /// and the report is returned, once `warmup_total_timeout` elapses —
    /// batches already dispatched at that point keep running to their own
    /// per-batch timeout rather than being cancelled; their results are
    /// folded in via shared atomics if they finish before this call returns.
    pub async fn warmup(self: &Arc<Self>, source: Arc<dyn WarmupSource>) -> Result<WarmupReport, CacheError> {
        let start = self.clock.now();
        if !self.config.enabled || !self.config.enable_warmup {
            return Ok(WarmupReport::default());
        }

        let max_keys = if self.config.warmup_max_keys == 0 || self.config.warmup_max_keys > 10_000 {
            1_000
        } else {
            self.config.warmup_max_keys
        };

        let keys = source.fetch_warmup_keys(max_keys).await;
        if keys.is_empty() {
            return Ok(WarmupReport::default());
        }

        let loaded = Arc::new(AtomicU64::new(0));
        let errors = Arc::new(AtomicU64::new(0));
        let mut handles = Vec::new();
        let mut timed_out = false;

        for batch in keys.chunks(self.config.warmup_batch_size.max(1)) {
            if self.clock.now().duration_since(start) >= self.config.warmup_total_timeout {
                timed_out = true;
                break;
            }
            let manager = Arc::clone(self);
            let batch = batch.to_vec();
            let batch_timeout = self.config.warmup_batch_timeout;
            let loaded = Arc::clone(&loaded);
            let errors = Arc::clone(&errors);
            handles.push(tokio::spawn(async move {
                match tokio::time::timeout(batch_timeout, manager.process_warmup_batch(&batch)).await {
                    Ok((batch_loaded, batch_errors)) => {
                        loaded.fetch_add(batch_loaded, Ordering::Relaxed);
                        errors.fetch_add(batch_errors, Ordering::Relaxed);
                    }
                    Err(_) => {
                        tracing::warn!("cache warmup batch timed out");
                        errors.fetch_add(batch.len() as u64, Ordering::Relaxed);
                    }
                }
            }));
        }

        let remaining = self.config.warmup_total_timeout.saturating_sub(self.clock.now().duration_since(start));
        let wait_for_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(remaining, wait_for_all).await.is_err() {
            timed_out = true;
        }

        let loaded = loaded.load(Ordering::Relaxed);
        let errors = errors.load(Ordering::Relaxed);
        let duration_ms = self.clock.now().duration_since(start).as_millis() as u64;
        self.observer.observe(ObservedEvent::CacheWarmupCompleted { loaded, errors, duration_ms });
        Ok(WarmupReport { loaded, errors, duration_ms, timed_out })
    }

    async fn process_warmup_batch(&self, batch: &[WarmupKey]) -> (u64, u64) {
        let mut loaded = 0;
        let mut errors = 0;
        for row in batch {
            let value = serde_json::json!({
                "key": row.key,
                "type": row.data_type,
            });
            let tags = [row.data_type.as_str()];
            match self.put(&row.key, value, &tags, None) {
                Ok(()) => loaded += 1,
                Err(_) => errors += 1,
            }
        }
        (loaded, errors)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
