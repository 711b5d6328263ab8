//! Location Recommender - suggests where to open a business of a given type
//!
//! This library provides the recommendation engine and its store adapters.
//! A request is resolved against the region hierarchy and business-type
//! taxonomy, searched in the location index, then scored and ranked.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Recommender, RecommendError, RecommendLimits, calculate_suitability_score, expand_region};
pub use models::{Location, Region, BusinessType, RecommendRequest, RecommendResult, ScoredLocation, ScoringModel, ScoringWeights};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let limits = RecommendLimits::default();
        assert_eq!(limits.normalize_limit(Some(0)), 20);
        assert_eq!(ScoringModel::default().weights, ScoringWeights::default());
    }
}
