// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BusinessType, BusinessTypeSuitability, GeoPoint, Location, LocationQuery, Region,
    ScoredLocation, ScoringModel, ScoringWeights,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendResult};
