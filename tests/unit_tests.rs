// Unit tests for the location recommender

use location_recommender::core::{
    distance::{haversine_distance_km, is_valid_point},
    filters::reconcile_candidates,
    ranking::rank_locations,
    region::expand_region,
    scoring::{calculate_suitability_score, NEUTRAL_PROXIMITY},
    RecommendError, RecommendLimits,
};
use location_recommender::models::{
    BusinessType, BusinessTypeSuitability, GeoPoint, Location, Region, ScoredLocation, ScoringModel, ScoringWeights,
};
use location_recommender::services::InMemoryReferenceStore;
use chrono::Utc;

fn business_type(id: &str) -> BusinessType {
    BusinessType {
        id: id.to_string(),
        name: id.replace('_', " "),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn region(id: &str, parent: Option<&str>) -> Region {
    Region {
        id: id.to_string(),
        name: id.to_string(),
        parent_region_id: parent.map(str::to_string),
        center_latitude: None,
        center_longitude: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn location(id: &str, region_id: &str, point: GeoPoint, density: f64, traffic: f64) -> Location {
    Location {
        id: id.to_string(),
        name: format!("Location {}", id),
        address: None,
        location: point,
        region_id: region_id.to_string(),
        business_types: vec![BusinessTypeSuitability {
            business_type_id: "coffee_shop".to_string(),
            competitor_density: density,
            foot_traffic: traffic,
        }],
        tags: vec![],
        description: None,
    }
}

fn scored(id: &str, score: f64) -> ScoredLocation {
    ScoredLocation {
        location: location(id, "R1", GeoPoint::new(0.0, 0.0), 0.0, 0.0),
        score,
        distance_km: None,
    }
}

const CENTER: GeoPoint = GeoPoint { lat: 48.8566, lon: 2.3522 };

#[test]
fn test_haversine_distance_zero() {
    assert!(haversine_distance_km(CENTER, CENTER) < 0.01);
}

#[test]
fn test_haversine_distance_paris_to_versailles() {
    // Roughly 17 km apart
    let versailles = GeoPoint::new(48.8049, 2.1204);
    let distance = haversine_distance_km(CENTER, versailles);
    assert!(distance > 14.0 && distance < 20.0);
}

#[test]
fn test_point_validity() {
    assert!(is_valid_point(CENTER));
    assert!(!is_valid_point(GeoPoint::new(91.0, 0.0)));
    assert!(!is_valid_point(GeoPoint::new(0.0, f64::NAN)));
}

#[test]
fn test_score_is_bounded() {
    let model = ScoringModel::default();
    let coffee = business_type("coffee_shop");

    for (density, traffic) in [(0.0, 0.0), (0.0, 1e12), (1e12, 0.0), (3.0, 800.0)] {
        let loc = location("a", "R1", CENTER, density, traffic);
        let result = calculate_suitability_score(&loc, &coffee, Some(CENTER), &model);
        assert!(result.score >= 0.0 && result.score <= 100.0, "score {} out of range", result.score);
    }
}

#[test]
fn test_more_competitors_never_scores_higher() {
    let model = ScoringModel::default();
    let coffee = business_type("coffee_shop");

    let mut previous = f64::INFINITY;
    for density in [0.0, 1.0, 2.0, 5.0, 20.0] {
        let loc = location("a", "R1", CENTER, density, 500.0);
        let score = calculate_suitability_score(&loc, &coffee, Some(CENTER), &model).score;
        assert!(score < previous);
        previous = score;
    }
}

#[test]
fn test_more_foot_traffic_never_scores_lower() {
    let model = ScoringModel::default();
    let coffee = business_type("coffee_shop");

    let mut previous = f64::NEG_INFINITY;
    for traffic in [0.0, 10.0, 100.0, 1000.0, 10000.0] {
        let loc = location("a", "R1", CENTER, 2.0, traffic);
        let score = calculate_suitability_score(&loc, &coffee, Some(CENTER), &model).score;
        assert!(score > previous);
        previous = score;
    }
}

#[test]
fn test_farther_from_center_never_scores_higher() {
    let model = ScoringModel::default();
    let coffee = business_type("coffee_shop");

    let near = location("near", "R1", GeoPoint::new(48.86, 2.35), 1.0, 500.0);
    let far = location("far", "R1", GeoPoint::new(49.50, 2.35), 1.0, 500.0);

    let near_score = calculate_suitability_score(&near, &coffee, Some(CENTER), &model);
    let far_score = calculate_suitability_score(&far, &coffee, Some(CENTER), &model);

    assert!(near_score.score > far_score.score);
    assert!(near_score.distance_km < far_score.distance_km);
}

#[test]
fn test_unknown_center_uses_neutral_proximity() {
    let model = ScoringModel {
        weights: ScoringWeights {
            competition: 0.0,
            demand: 0.0,
            proximity: 1.0,
        },
        ..ScoringModel::default()
    };
    let loc = location("a", "R1", CENTER, 0.0, 0.0);

    let result = calculate_suitability_score(&loc, &business_type("coffee_shop"), None, &model);
    assert_eq!(result.distance_km, None);
    assert!((result.score - NEUTRAL_PROXIMITY * 100.0).abs() < 1e-9);
}

#[test]
fn test_limit_normalization() {
    let limits = RecommendLimits::default();

    assert_eq!(limits.normalize_limit(None), limits.default_limit);
    assert_eq!(limits.normalize_limit(Some(0)), limits.default_limit);
    assert_eq!(limits.normalize_limit(Some(5)), 5);
    assert_eq!(limits.normalize_limit(Some(u32::MAX)), limits.max_limit);
}

#[test]
fn test_ranking_orders_by_score_then_id() {
    let ranked = rank_locations(
        vec![scored("c", 50.0), scored("b", 80.0), scored("a", 50.0), scored("d", 10.0)],
        3,
    );

    let ids: Vec<_> = ranked.iter().map(|s| s.location.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[test]
fn test_ranking_with_fewer_candidates_than_limit() {
    let ranked = rank_locations(vec![scored("a", 1.0)], 20);
    assert_eq!(ranked.len(), 1);
    assert!(rank_locations(vec![], 20).is_empty());
}

#[tokio::test]
async fn test_expand_region_covers_descendants_only() {
    let store = InMemoryReferenceStore::new();
    store.insert_region(region("World", None)).await;
    store.insert_region(region("Country", Some("World"))).await;
    store.insert_region(region("CityA", Some("Country"))).await;
    store.insert_region(region("CityB", Some("Country"))).await;
    store.insert_region(region("CityC", Some("World"))).await;

    let scope = expand_region(&store, "Country", 32).await.unwrap();

    let ids: Vec<_> = scope.ids().map(String::as_str).collect();
    assert_eq!(ids, vec!["CityA", "CityB", "Country"]);
    assert!(!scope.contains("CityC"));
    assert!(!scope.contains("World"));
}

#[tokio::test]
async fn test_expand_region_reports_cycles() {
    let store = InMemoryReferenceStore::new();
    store.insert_region(region("A", Some("C"))).await;
    store.insert_region(region("B", Some("A"))).await;
    store.insert_region(region("C", Some("B"))).await;

    let err = expand_region(&store, "A", 32).await.unwrap_err();
    assert!(matches!(err, RecommendError::DataIntegrity(_)));
}

#[tokio::test]
async fn test_reconcile_drops_out_of_scope_and_untyped_hits() {
    let store = InMemoryReferenceStore::new();
    store.insert_region(region("Country", None)).await;
    store.insert_region(region("CityA", Some("Country"))).await;
    let scope = expand_region(&store, "Country", 32).await.unwrap();

    let mut untyped = location("untyped", "CityA", CENTER, 0.0, 0.0);
    untyped.business_types.clear();

    let kept = reconcile_candidates(
        vec![
            location("in", "CityA", CENTER, 0.0, 0.0),
            location("out", "CityC", CENTER, 0.0, 0.0),
            untyped,
            location("in", "CityA", CENTER, 0.0, 0.0),
        ],
        &scope,
        "coffee_shop",
    );

    let ids: Vec<_> = kept.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["in"]);
}
