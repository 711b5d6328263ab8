use crate::models::{BusinessType, GeoPoint, Location, ScoringModel};
use crate::core::distance::{haversine_distance_km, is_valid_point};

/// Proximity signal used when the target region has no known center
pub const NEUTRAL_PROXIMITY: f64 = 0.5;

/// Result of scoring a single candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuitabilityScore {
    /// Final score in `[0, 100]`
    pub score: f64,
    /// Distance to the region center, when it could be computed
    pub distance_km: Option<f64>,
}

/// Calculate the suitability score (0-100) of a location for a business type
///
/// Scoring formula:
/// score = 100 * (
///     competition * w_competition +   # 1 / (1 + competitor_density)
///     demand      * w_demand +        # foot_traffic / (foot_traffic + saturation)
///     proximity   * w_proximity       # decay / (decay + distance)
/// ) / (w_competition + w_demand + w_proximity)
///
/// Each signal is strictly monotonic over its valid input range, so the score
/// falls with competitor density and distance and rises with foot traffic.
pub fn calculate_suitability_score(
    location: &Location,
    business_type: &BusinessType,
    target_center: Option<GeoPoint>,
    model: &ScoringModel,
) -> SuitabilityScore {
    let suitability = location.suitability_for(&business_type.id);

    // No entry for the type: the location gives no evidence of demand or of a
    // free market, so both signals bottom out.
    let (competition, demand) = match suitability {
        Some(s) => (
            competition_signal(s.competitor_density),
            demand_signal(s.foot_traffic, model.demand_saturation),
        ),
        None => (0.0, 0.0),
    };

    let distance_km = target_center
        .filter(|center| is_valid_point(*center) && is_valid_point(location.location))
        .map(|center| haversine_distance_km(center, location.location));

    let proximity = match distance_km {
        Some(d) => proximity_signal(d, model.distance_decay_km),
        None => NEUTRAL_PROXIMITY,
    };

    let weights = &model.weights;
    let w_competition = sanitize(weights.competition);
    let w_demand = sanitize(weights.demand);
    let w_proximity = sanitize(weights.proximity);
    let weight_sum = w_competition + w_demand + w_proximity;

    let score = if weight_sum > 0.0 {
        (competition * w_competition + demand * w_demand + proximity * w_proximity) / weight_sum
            * 100.0
    } else {
        0.0
    };

    SuitabilityScore {
        score: score.clamp(0.0, 100.0),
        distance_km,
    }
}

/// Competition signal [0-1], lower density = higher signal
#[inline]
fn competition_signal(competitor_density: f64) -> f64 {
    if competitor_density == f64::INFINITY {
        return 0.0;
    }
    1.0 / (1.0 + sanitize(competitor_density))
}

/// Demand signal [0-1], saturating in foot traffic
#[inline]
fn demand_signal(foot_traffic: f64, saturation: f64) -> f64 {
    if foot_traffic == f64::INFINITY {
        return 1.0;
    }
    let traffic = sanitize(foot_traffic);
    let saturation = if saturation.is_finite() && saturation > 0.0 { saturation } else { 1.0 };
    traffic / (traffic + saturation)
}

/// Proximity signal (0-1], hyperbolic distance decay
///
/// Halves at `decay_km` and keeps falling measurably out to antipodal
/// distances, so candidates across a whole country still separate.
#[inline]
fn proximity_signal(distance_km: f64, decay_km: f64) -> f64 {
    let decay = if decay_km.is_finite() && decay_km > 0.0 { decay_km } else { 1.0 };
    decay / (decay + sanitize(distance_km))
}

/// Negative, NaN and infinite raw values count as zero
#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessTypeSuitability, ScoringWeights};
    use chrono::Utc;

    fn coffee_shop() -> BusinessType {
        BusinessType {
            id: "coffee_shop".to_string(),
            name: "Coffee shop".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_location(lat: f64, lon: f64, density: f64, traffic: f64) -> Location {
        Location {
            id: "loc".to_string(),
            name: "Test location".to_string(),
            address: None,
            location: GeoPoint::new(lat, lon),
            region_id: "R1".to_string(),
            business_types: vec![BusinessTypeSuitability {
                business_type_id: "coffee_shop".to_string(),
                competitor_density: density,
                foot_traffic: traffic,
            }],
            tags: vec![],
            description: None,
        }
    }

    const CENTER: GeoPoint = GeoPoint { lat: 55.7558, lon: 37.6173 };

    #[test]
    fn test_score_within_range() {
        let model = ScoringModel::default();
        let location = create_location(55.76, 37.62, 3.0, 800.0);

        let result = calculate_suitability_score(&location, &coffee_shop(), Some(CENTER), &model);

        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert!(result.distance_km.unwrap() < 1.0);
    }

    #[test]
    fn test_density_strictly_decreases_score() {
        let model = ScoringModel::default();
        let bt = coffee_shop();

        let sparse = calculate_suitability_score(&create_location(55.76, 37.62, 1.0, 500.0), &bt, Some(CENTER), &model);
        let dense = calculate_suitability_score(&create_location(55.76, 37.62, 1.5, 500.0), &bt, Some(CENTER), &model);

        assert!(sparse.score > dense.score);
    }

    #[test]
    fn test_distance_strictly_decreases_score() {
        let model = ScoringModel::default();
        let bt = coffee_shop();

        let near = calculate_suitability_score(&create_location(55.80, 37.62, 2.0, 500.0), &bt, Some(CENTER), &model);
        let far = calculate_suitability_score(&create_location(55.90, 37.62, 2.0, 500.0), &bt, Some(CENTER), &model);

        assert!(near.score > far.score);
        assert!(near.distance_km.unwrap() < far.distance_km.unwrap());
    }

    #[test]
    fn test_distance_still_separates_at_country_scale() {
        let model = ScoringModel::default();
        let bt = coffee_shop();

        // Minsk (~680 km), Yekaterinburg (~1400 km), Vladivostok (~6400 km) from Moscow
        let near = calculate_suitability_score(&create_location(53.90, 27.56, 2.0, 500.0), &bt, Some(CENTER), &model);
        let mid = calculate_suitability_score(&create_location(56.84, 60.61, 2.0, 500.0), &bt, Some(CENTER), &model);
        let far = calculate_suitability_score(&create_location(43.12, 131.89, 2.0, 500.0), &bt, Some(CENTER), &model);

        assert!(far.distance_km.unwrap() > 6000.0);
        assert!(near.score > mid.score);
        assert!(mid.score > far.score);
    }

    #[test]
    fn test_saturated_market_scores_no_competition_signal() {
        let model = ScoringModel {
            weights: ScoringWeights {
                competition: 1.0,
                demand: 0.0,
                proximity: 0.0,
            },
            ..ScoringModel::default()
        };
        let bt = coffee_shop();

        let huge = calculate_suitability_score(&create_location(55.76, 37.62, 1e300, 500.0), &bt, Some(CENTER), &model);
        let infinite = calculate_suitability_score(&create_location(55.76, 37.62, f64::INFINITY, 500.0), &bt, Some(CENTER), &model);

        assert_eq!(infinite.score, 0.0);
        assert!(infinite.score <= huge.score);

        let nan = calculate_suitability_score(&create_location(55.76, 37.62, f64::NAN, 500.0), &bt, Some(CENTER), &model);
        assert_eq!(nan.score, 100.0);
    }

    #[test]
    fn test_demand_increases_score() {
        let model = ScoringModel::default();
        let bt = coffee_shop();

        let quiet = calculate_suitability_score(&create_location(55.76, 37.62, 2.0, 100.0), &bt, Some(CENTER), &model);
        let busy = calculate_suitability_score(&create_location(55.76, 37.62, 2.0, 5000.0), &bt, Some(CENTER), &model);

        assert!(busy.score > quiet.score);
    }

    #[test]
    fn test_unknown_center_uses_neutral_proximity() {
        let model = ScoringModel::default();
        let location = create_location(55.76, 37.62, 0.0, 0.0);

        let result = calculate_suitability_score(&location, &coffee_shop(), None, &model);

        // competition = 1, demand = 0, proximity = 0.5
        let expected = (0.40 * 1.0 + 0.25 * NEUTRAL_PROXIMITY) / 1.0 * 100.0;
        assert!((result.score - expected).abs() < 1e-9);
        assert_eq!(result.distance_km, None);
    }

    #[test]
    fn test_total_on_garbage_inputs() {
        let model = ScoringModel::default();
        let mut location = create_location(f64::NAN, 37.62, f64::INFINITY, -10.0);
        location.business_types[0].competitor_density = f64::NAN;

        let result = calculate_suitability_score(&location, &coffee_shop(), Some(CENTER), &model);

        assert!(result.score.is_finite());
        assert_eq!(result.distance_km, None);
    }

    #[test]
    fn test_missing_suitability_scores_lower() {
        let model = ScoringModel::default();
        let with_entry = create_location(55.76, 37.62, 5.0, 10.0);
        let mut without_entry = with_entry.clone();
        without_entry.business_types.clear();

        let a = calculate_suitability_score(&with_entry, &coffee_shop(), Some(CENTER), &model);
        let b = calculate_suitability_score(&without_entry, &coffee_shop(), Some(CENTER), &model);

        assert!(a.score > b.score);
    }

    #[test]
    fn test_zero_weights_yield_zero() {
        let mut model = ScoringModel::default();
        model.weights.competition = 0.0;
        model.weights.demand = 0.0;
        model.weights.proximity = 0.0;

        let result = calculate_suitability_score(&create_location(55.76, 37.62, 0.0, 900.0), &coffee_shop(), Some(CENTER), &model);
        assert_eq!(result.score, 0.0);
    }
}
