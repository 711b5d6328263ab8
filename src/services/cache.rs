use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{BusinessType, Region};

use super::{ReferenceStore, StoreError};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache; L2 is Redis, shared across instances and
/// optional. Without Redis the manager runs L1 only.
pub struct CacheManager {
    redis: Option<ConnectionManager>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager; `redis_url = None` disables L2
    pub async fn new(redis_url: Option<&str>, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let redis = match redis_url {
            Some(url) => {
                let client = redis::Client::open(url)?;
                Some(ConnectionManager::new(client).await?)
            }
            None => None,
        };

        Ok(Self::build(redis, l1_size, ttl_secs))
    }

    /// In-process cache without Redis
    pub fn local(l1_size: u64, ttl_secs: u64) -> Self {
        Self::build(None, l1_size, ttl_secs)
    }

    fn build(redis: Option<ConnectionManager>, l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis,
            l1_cache,
            ttl_secs,
        }
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        // ConnectionManager is a cheap multiplexed handle; clone per call
        let Some(mut conn) = self.redis.clone() else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in cache (both L1 and L2)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(mut conn) = self.redis.clone() {
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            l2_enabled: self.redis.is_some(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub l2_enabled: bool,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a region
    pub fn region(region_id: &str) -> String {
        format!("region:{}", region_id)
    }

    /// Build a cache key for the direct children of a region
    pub fn region_children(region_id: &str) -> String {
        format!("region_children:{}", region_id)
    }

    /// Build a cache key for a business type
    pub fn business_type(business_type_id: &str) -> String {
        format!("business_type:{}", business_type_id)
    }
}

/// Reference store fronted by the cache
///
/// Point lookups and child lists are cached, including negative lookups.
/// A failing cache never fails the request: the error is logged and the
/// inner store answers instead. Listings always go to the inner store.
pub struct CachedReferenceStore<S> {
    inner: S,
    cache: Arc<CacheManager>,
}

impl<S: ReferenceStore> CachedReferenceStore<S> {
    pub fn new(inner: S, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    async fn cached<T>(&self, key: String) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.cache.get(&key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, using store: {}", key, e);
                None
            }
        }
    }

    async fn remember<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!("Failed to populate cache for {}: {}", key, e);
        }
    }
}

#[async_trait]
impl<S: ReferenceStore> ReferenceStore for CachedReferenceStore<S> {
    async fn get_region(&self, id: &str) -> Result<Option<Region>, StoreError> {
        let key = CacheKey::region(id);
        if let Some(hit) = self.cached::<Option<Region>>(key.clone()).await {
            return Ok(hit);
        }

        let region = self.inner.get_region(id).await?;
        self.remember(&key, &region).await;
        Ok(region)
    }

    async fn get_region_children(&self, id: &str) -> Result<Vec<Region>, StoreError> {
        let key = CacheKey::region_children(id);
        if let Some(hit) = self.cached::<Vec<Region>>(key.clone()).await {
            return Ok(hit);
        }

        let children = self.inner.get_region_children(id).await?;
        self.remember(&key, &children).await;
        Ok(children)
    }

    async fn get_business_type(&self, id: &str) -> Result<Option<BusinessType>, StoreError> {
        let key = CacheKey::business_type(id);
        if let Some(hit) = self.cached::<Option<BusinessType>>(key.clone()).await {
            return Ok(hit);
        }

        let business_type = self.inner.get_business_type(id).await?;
        self.remember(&key, &business_type).await;
        Ok(business_type)
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        self.inner.list_regions().await
    }

    async fn list_business_types(&self) -> Result<Vec<BusinessType>, StoreError> {
        self.inner.list_business_types().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
