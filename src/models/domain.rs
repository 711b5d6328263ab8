use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic point as stored in the location index (`geo_point` object form)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Per-business-type signals attached to a location document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessTypeSuitability {
    pub business_type_id: String,
    /// Existing competitors of this type around the location
    #[serde(default)]
    pub competitor_density: f64,
    /// Estimated daily foot traffic
    #[serde(default)]
    pub foot_traffic: f64,
}

/// Location document owned by the location index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub location: GeoPoint,
    pub region_id: String,
    #[serde(default)]
    pub business_types: Vec<BusinessTypeSuitability>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Location {
    /// Suitability entry for the given business type, if the location carries one
    pub fn suitability_for(&self, business_type_id: &str) -> Option<&BusinessTypeSuitability> {
        self.business_types
            .iter()
            .find(|s| s.business_type_id == business_type_id)
    }
}

/// Business type from the reference taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrative region; regions form a tree through `parent_region_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_region_id: Option<String>,
    #[serde(default)]
    pub center_latitude: Option<f64>,
    #[serde(default)]
    pub center_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Region {
    /// Administrative center, when both coordinates are known
    pub fn center(&self) -> Option<GeoPoint> {
        match (self.center_latitude, self.center_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Location with its computed suitability score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLocation {
    #[serde(flatten)]
    pub location: Location,
    pub score: f64,
    #[serde(rename = "distance_km", skip_serializing_if = "Option::is_none", default)]
    pub distance_km: Option<f64>,
}

/// Query sent to the location index
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub region_ids: Vec<String>,
    pub business_type_id: String,
    pub fetch_count: usize,
}

/// Relative importance of each scoring signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub competition: f64,
    pub demand: f64,
    pub proximity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            competition: 0.40,
            demand: 0.35,
            proximity: 0.25,
        }
    }
}

/// Weights plus the curve parameters of the suitability score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    pub weights: ScoringWeights,
    /// Distance at which the proximity signal drops to 0.5
    pub distance_decay_km: f64,
    /// Foot traffic at which the demand signal reaches 0.5
    pub demand_saturation: f64,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            distance_decay_km: 25.0,
            demand_saturation: 1000.0,
        }
    }
}
