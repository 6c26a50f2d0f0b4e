use crate::models::{BookingWindow, CaregiverRecord, SeniorRecord};
use crate::services::repository::{CareDataRepository, RepositoryError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// TTL cache in front of another repository
///
/// Caches the caregiver pool per booking window and senior lookups per id.
/// Errors are never cached.
pub struct CachedRepository {
    inner: Arc<dyn CareDataRepository>,
    caregivers: moka::future::Cache<String, Arc<Vec<CaregiverRecord>>>,
    seniors: moka::future::Cache<String, Option<SeniorRecord>>,
}

impl CachedRepository {
    /// Wrap a repository with a cache holding at most `max_entries` per kind
    pub fn new(inner: Arc<dyn CareDataRepository>, max_entries: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);

        Self {
            inner,
            caregivers: moka::future::CacheBuilder::new(max_entries)
                .time_to_live(ttl)
                .build(),
            seniors: moka::future::CacheBuilder::new(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        self.caregivers.invalidate_all();
        self.seniors.invalidate_all();
        tracing::debug!("Invalidated repository cache");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            caregiver_entries: self.caregivers.entry_count(),
            senior_entries: self.seniors.entry_count(),
        }
    }
}

#[async_trait]
impl CareDataRepository for CachedRepository {
    async fn load_caregivers(
        &self,
        window: Option<&BookingWindow>,
    ) -> Result<Vec<CaregiverRecord>, RepositoryError> {
        let key = CacheKey::caregivers(window);

        if let Some(pool) = self.caregivers.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(pool.as_ref().clone());
        }

        tracing::trace!("Cache miss: {}", key);
        let pool = self.inner.load_caregivers(window).await?;
        self.caregivers.insert(key, Arc::new(pool.clone())).await;
        Ok(pool)
    }

    async fn find_senior(&self, senior_id: &str) -> Result<Option<SeniorRecord>, RepositoryError> {
        let key = CacheKey::senior(senior_id);

        if let Some(senior) = self.seniors.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(senior);
        }

        tracing::trace!("Cache miss: {}", key);
        let senior = self.inner.find_senior(senior_id).await?;
        self.seniors.insert(key, senior.clone()).await;
        Ok(senior)
    }

    // Counts only feed the stats view and are not cached
    async fn count_seniors(&self) -> Result<Option<usize>, RepositoryError> {
        self.inner.count_seniors().await
    }

    async fn count_bookings(&self) -> Result<Option<usize>, RepositoryError> {
        self.inner.count_bookings().await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub caregiver_entries: u64,
    pub senior_entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the caregiver pool seen from a booking window
    pub fn caregivers(window: Option<&BookingWindow>) -> String {
        match window {
            Some(w) => format!(
                "caregivers:{}:{}:{}",
                w.date.format("%Y-%m-%d"),
                w.start_time.format("%H:%M:%S"),
                w.duration_hours
            ),
            None => "caregivers:all".to_string(),
        }
    }

    /// Build a cache key for a senior lookup
    pub fn senior(senior_id: &str) -> String {
        format!("senior:{}", senior_id)
    }
}
