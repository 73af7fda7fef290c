// ===============================
// src/cache.rs
// ===============================
//
// Per-mode report cache with a fixed TTL (default 1h, see config).
// Relaxed guarantee: the lock is not held across the rebuild, so two
// callers missing at the same instant may both invoke the builder; the
// later result wins the slot. Acceptable given the 1h staleness budget.
//
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashMap as HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ReportMode;
use crate::domain::ReportRow;
use crate::metrics::{CACHE_HITS, CACHE_MISSES};

struct CacheSlot {
    built_at: Instant,
    rows: Arc<Vec<ReportRow>>,
}

pub struct ReportCache {
    ttl: Duration,
    slots: Mutex<HashMap<ReportMode, CacheSlot>>,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached rows for `mode` if the slot is fresh, otherwise
    /// run `build` and store the result.
    pub async fn get_or_compute<F, Fut>(&self, mode: ReportMode, build: F) -> Arc<Vec<ReportRow>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<ReportRow>>,
    {
        {
            let slots = self.slots.lock().await;
            if let Some(slot) = slots.get(&mode) {
                if slot.built_at.elapsed() < self.ttl {
                    CACHE_HITS.with_label_values(&[mode.as_str()]).inc();
                    debug!(mode = mode.as_str(), "report cache hit");
                    return Arc::clone(&slot.rows);
                }
            }
        }

        CACHE_MISSES.with_label_values(&[mode.as_str()]).inc();
        debug!(mode = mode.as_str(), "report cache miss, rebuilding");
        let rows = Arc::new(build().await);

        let mut slots = self.slots.lock().await;
        slots.insert(
            mode,
            CacheSlot {
                built_at: Instant::now(),
                rows: Arc::clone(&rows),
            },
        );
        rows
    }

    /// Drop every cached slot; the next call per mode rebuilds.
    pub async fn invalidate(&self) {
        self.slots.lock().await.clear();
        debug!("report cache invalidated");
    }
}
