use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for location recommendations
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "region", alias = "region_id", default)]
    pub region_id: String,
    #[validate(length(min = 1))]
    #[serde(rename = "business_type", alias = "business_type_id", default)]
    pub business_type_id: String,
    /// Zero or absent means "use the default limit"
    #[serde(default)]
    pub limit: Option<u32>,
}

impl RecommendRequest {
    pub fn new(region_id: impl Into<String>, business_type_id: impl Into<String>) -> Self {
        Self {
            region_id: region_id.into(),
            business_type_id: business_type_id.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
