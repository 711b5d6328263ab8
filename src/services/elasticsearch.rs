use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Location, LocationQuery};

use super::{LocationIndex, StoreError};

/// Errors that can occur when interacting with Elasticsearch
#[derive(Debug, Error)]
pub enum ElasticsearchError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Elasticsearch returned {status}: {message}")]
    ApiError { status: StatusCode, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<ElasticsearchError> for StoreError {
    fn from(value: ElasticsearchError) -> Self {
        match value {
            ElasticsearchError::RequestError(e) if e.is_timeout() => {
                StoreError::Timeout(format!("elasticsearch: {}", e))
            }
            ElasticsearchError::RequestError(e) if e.is_decode() => {
                StoreError::Malformed(format!("elasticsearch: {}", e))
            }
            ElasticsearchError::RequestError(e) => StoreError::Unavailable(format!("elasticsearch: {}", e)),
            ElasticsearchError::ApiError { status, message }
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS =>
            {
                StoreError::Unavailable(format!("elasticsearch {}: {}", status, message))
            }
            ElasticsearchError::ApiError { status, message } => {
                StoreError::Malformed(format!("elasticsearch {}: {}", status, message))
            }
            ElasticsearchError::InvalidResponse(msg) => StoreError::Malformed(msg),
        }
    }
}

/// Elasticsearch location index client
///
/// Handles all communication with the search cluster:
/// - Filtered candidate search over a region set
/// - Single document lookup
/// - Cluster health
pub struct ElasticsearchClient {
    base_url: String,
    index: String,
    credentials: Option<(String, String)>,
    client: Client,
}

impl ElasticsearchClient {
    /// Create a new Elasticsearch client
    pub fn new(
        base_url: String,
        index: String,
        credentials: Option<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, ElasticsearchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            index,
            credentials,
            client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// Build the search body for a candidate query
    ///
    /// Hits are restricted to the region set and to documents carrying the
    /// business type, and come back busiest-first for that type so the
    /// over-fetched window favours high-demand locations.
    pub fn build_search_body(query: &LocationQuery) -> Value {
        let type_filter = json!({
            "term": { "business_types.business_type_id": query.business_type_id }
        });

        json!({
            "size": query.fetch_count,
            "query": {
                "bool": {
                    "filter": [
                        { "terms": { "region_id": query.region_ids } },
                        {
                            "nested": {
                                "path": "business_types",
                                "query": type_filter
                            }
                        }
                    ]
                }
            },
            "sort": [
                {
                    "business_types.foot_traffic": {
                        "order": "desc",
                        "nested": { "path": "business_types", "filter": type_filter }
                    }
                },
                // Documents may lack an `id` field and fall back to `_id`
                { "id": { "order": "asc", "unmapped_type": "keyword" } }
            ]
        })
    }

    /// Search for candidate locations
    pub async fn search(&self, query: &LocationQuery) -> Result<Vec<Location>, ElasticsearchError> {
        if query.region_ids.is_empty() || query.fetch_count == 0 {
            return Ok(vec![]);
        }

        let url = format!("{}/{}/_search", self.base_url, self.index);
        let body = Self::build_search_body(query);

        tracing::debug!(
            "Searching {} for type {} across {} regions",
            self.index,
            query.business_type_id,
            query.region_ids.len()
        );

        let response = self.authorize(self.client.post(&url)).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ElasticsearchError::ApiError { status, message });
        }

        let json: Value = response.json().await?;

        let hits = json
            .pointer("/hits/hits")
            .and_then(|h| h.as_array())
            .ok_or_else(|| ElasticsearchError::InvalidResponse("Missing hits array".into()))?;

        let locations: Vec<Location> = hits
            .iter()
            .filter_map(|hit| match parse_hit(hit) {
                Ok(location) => Some(location),
                Err(e) => {
                    tracing::warn!("Skipping unparseable location document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Queried {} locations (raw hits: {})", locations.len(), hits.len());

        Ok(locations)
    }

    /// Get a single location by id
    pub async fn get(&self, id: &str) -> Result<Option<Location>, ElasticsearchError> {
        let url = format!(
            "{}/{}/_doc/{}",
            self.base_url,
            self.index,
            urlencoding::encode(id)
        );

        let response = self.authorize(self.client.get(&url)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ElasticsearchError::ApiError { status, message });
        }

        let json: Value = response.json().await?;
        if !json.get("found").and_then(|f| f.as_bool()).unwrap_or(false) {
            return Ok(None);
        }

        parse_hit(&json).map(Some)
    }

    /// Health check for the cluster
    pub async fn health_check(&self) -> Result<bool, ElasticsearchError> {
        let url = format!("{}/_cluster/health", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

/// Convert a hit (or `_doc` response) into a Location, falling back to `_id`
/// when the source carries no id of its own
fn parse_hit(hit: &Value) -> Result<Location, ElasticsearchError> {
    let source = hit
        .get("_source")
        .ok_or_else(|| ElasticsearchError::InvalidResponse("Missing _source".into()))?;

    let mut location: Location = serde_json::from_value(source.clone())
        .map_err(|e| ElasticsearchError::InvalidResponse(format!("Failed to parse location: {}", e)))?;

    if location.id.is_empty() {
        location.id = hit
            .get("_id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| ElasticsearchError::InvalidResponse("Missing document id".into()))?
            .to_string();
    }

    Ok(location)
}

#[async_trait]
impl LocationIndex for ElasticsearchClient {
    async fn search_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError> {
        Ok(self.search(query).await?)
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        Ok(self.get(id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.health_check().await? {
            Ok(())
        } else {
            Err(StoreError::Unavailable("elasticsearch cluster unhealthy".into()))
        }
    }
}
