use serde::{Deserialize, Serialize};
use crate::models::domain::ScoredLocation;

/// Ranked recommendation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResult {
    pub locations: Vec<ScoredLocation>,
    /// Number of locations returned
    pub total: usize,
    /// Number of raw hits the index returned before reconciliation
    pub candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub reference_store: bool,
    pub location_index: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
