use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{BusinessType, Location, LocationQuery, Region};

use super::{LocationIndex, ReferenceStore, StoreError};

/// Reference store held in memory, for tests, benchmarks and local runs
#[derive(Default)]
pub struct InMemoryReferenceStore {
    regions: RwLock<HashMap<String, Region>>,
    business_types: RwLock<HashMap<String, BusinessType>>,
}

impl InMemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_region(&self, region: Region) {
        let mut regions = self.regions.write().await;
        regions.insert(region.id.clone(), region);
    }

    pub async fn insert_business_type(&self, business_type: BusinessType) {
        let mut business_types = self.business_types.write().await;
        business_types.insert(business_type.id.clone(), business_type);
    }
}

#[async_trait]
impl ReferenceStore for InMemoryReferenceStore {
    async fn get_region(&self, id: &str) -> Result<Option<Region>, StoreError> {
        let regions = self.regions.read().await;
        Ok(regions.get(id).cloned())
    }

    async fn get_region_children(&self, id: &str) -> Result<Vec<Region>, StoreError> {
        let regions = self.regions.read().await;
        let mut children: Vec<Region> = regions
            .values()
            .filter(|r| r.parent_region_id.as_deref() == Some(id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(children)
    }

    async fn get_business_type(&self, id: &str) -> Result<Option<BusinessType>, StoreError> {
        let business_types = self.business_types.read().await;
        Ok(business_types.get(id).cloned())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        let regions = self.regions.read().await;
        let mut all: Vec<Region> = regions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn list_business_types(&self) -> Result<Vec<BusinessType>, StoreError> {
        let business_types = self.business_types.read().await;
        let mut all: Vec<BusinessType> = business_types.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}

/// Location index held in memory
///
/// Applies the same region and business-type filters as the Elasticsearch
/// query, returning hits in id order.
#[derive(Default)]
pub struct InMemoryLocationIndex {
    locations: RwLock<HashMap<String, Location>>,
}

impl InMemoryLocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, location: Location) {
        let mut locations = self.locations.write().await;
        locations.insert(location.id.clone(), location);
    }

    pub async fn len(&self) -> usize {
        self.locations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locations.read().await.is_empty()
    }
}

#[async_trait]
impl LocationIndex for InMemoryLocationIndex {
    async fn search_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError> {
        let locations = self.locations.read().await;
        let mut hits: Vec<Location> = locations
            .values()
            .filter(|l| query.region_ids.iter().any(|r| *r == l.region_id))
            .filter(|l| l.suitability_for(&query.business_type_id).is_some())
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits.truncate(query.fetch_count);
        Ok(hits)
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        let locations = self.locations.read().await;
        Ok(locations.get(id).cloned())
    }
}
