// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod ranking;
pub mod recommender;
pub mod region;
pub mod scoring;

pub use distance::{haversine_distance_km, is_valid_point};
pub use error::RecommendError;
pub use filters::reconcile_candidates;
pub use ranking::{compare_ranked, rank_locations};
pub use recommender::{RecommendLimits, Recommender};
pub use region::{expand_region, RegionScope};
pub use scoring::{calculate_suitability_score, SuitabilityScore, NEUTRAL_PROXIMITY};
