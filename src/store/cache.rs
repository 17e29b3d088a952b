//! Read-through cache over the template backend.
//!
//! The whole table is cached as one snapshot. Any write through the
//! repository invalidates it, so a reader never sees a snapshot older than
//! the last local write.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::metrics::CacheMetrics;
use crate::template::Template;

use super::backend::StoreError;

struct Snapshot {
    templates: Arc<Vec<Template>>,
    fetched_at: Instant,
}

/// Cache status for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub enabled: bool,
    pub ttl_seconds: u64,
    /// Age of the current snapshot, if one is held
    pub age_seconds: Option<u64>,
    pub entries: usize,
}

/// TTL snapshot cache for the template list.
pub struct TemplateCache {
    enabled: bool,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl TemplateCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            enabled,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.enabled, Duration::from_secs(config.ttl_seconds))
    }

    /// A cache that always reloads.
    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the cached snapshot, or run `load` and cache its result.
    ///
    /// Load errors are returned as-is and leave the cache empty.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<Vec<Template>>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Template>, StoreError>>,
    {
        if !self.enabled {
            return Ok(Arc::new(load().await?));
        }

        if let Some(templates) = self.fresh().await {
            CacheMetrics::record_hit();
            return Ok(templates);
        }

        let mut guard = self.snapshot.write().await;

        // Another task may have reloaded while we waited for the lock
        if let Some(snapshot) = guard.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                CacheMetrics::record_hit();
                return Ok(snapshot.templates.clone());
            }
        }

        CacheMetrics::record_miss();
        let templates = Arc::new(load().await?);
        *guard = Some(Snapshot {
            templates: templates.clone(),
            fetched_at: Instant::now(),
        });

        tracing::debug!(entries = templates.len(), "Template cache refreshed");
        Ok(templates)
    }

    async fn fresh(&self) -> Option<Arc<Vec<Template>>> {
        let guard = self.snapshot.read().await;
        guard
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
            .map(|s| s.templates.clone())
    }

    /// Drop the snapshot so the next read goes to the backend.
    pub async fn invalidate(&self) {
        let had_snapshot = self.snapshot.write().await.take().is_some();
        if had_snapshot {
            CacheMetrics::record_invalidation();
            tracing::debug!("Template cache invalidated");
        }
    }

    pub async fn info(&self) -> CacheInfo {
        let guard = self.snapshot.read().await;
        CacheInfo {
            enabled: self.enabled,
            ttl_seconds: self.ttl.as_secs(),
            age_seconds: guard.as_ref().map(|s| s.fetched_at.elapsed().as_secs()),
            entries: guard.as_ref().map(|s| s.templates.len()).unwrap_or(0),
        }
    }
}
