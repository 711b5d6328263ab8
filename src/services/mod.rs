// Service exports
pub mod cache;
pub mod elasticsearch;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BusinessType, Location, LocationQuery, Region};

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats, CachedReferenceStore};
pub use elasticsearch::{ElasticsearchClient, ElasticsearchError};
pub use memory::{InMemoryLocationIndex, InMemoryReferenceStore};
pub use postgres::{PostgresClient, PostgresError};

/// Classified failure of a backing store
///
/// Stores never retry here; the connection layers below (sqlx pool, reqwest)
/// own retries and timeouts.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store timed out: {0}")]
    Timeout(String),

    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Relational reference data: region hierarchy and business-type taxonomy
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn get_region(&self, id: &str) -> Result<Option<Region>, StoreError>;

    /// Direct children of a region, ordered by id
    async fn get_region_children(&self, id: &str) -> Result<Vec<Region>, StoreError>;

    async fn get_business_type(&self, id: &str) -> Result<Option<BusinessType>, StoreError>;

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError>;

    async fn list_business_types(&self) -> Result<Vec<BusinessType>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Searchable index of location documents
#[async_trait]
pub trait LocationIndex: Send + Sync {
    /// Locations in any of the query's regions that carry the business type,
    /// at most `fetch_count` of them
    async fn search_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError>;

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
