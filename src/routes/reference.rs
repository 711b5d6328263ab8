use actix_web::{web, HttpResponse, Responder};

use crate::core::RecommendError;
use crate::models::HealthResponse;
use crate::routes::{error_response, method_not_allowed, AppState};

/// Configure lookup and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(health_check))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/locations/{id}")
            .route(web::get().to(get_location))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/business-types")
            .route(web::get().to(list_business_types))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/regions")
            .route(web::get().to(list_regions))
            .default_service(web::to(method_not_allowed)),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let (reference, index) = tokio::join!(state.reference.ping(), state.index.ping());

    if let Err(e) = &reference {
        tracing::warn!("Reference store health check failed: {}", e);
    }
    if let Err(e) = &index {
        tracing::warn!("Location index health check failed: {}", e);
    }

    let reference_ok = reference.is_ok();
    let index_ok = index.is_ok();
    let status = if reference_ok && index_ok { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reference_store: reference_ok,
        location_index: index_ok,
        timestamp: chrono::Utc::now(),
    })
}

/// Location details endpoint
///
/// GET /api/v1/locations/{id}
async fn get_location(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.index.get_location(&id).await {
        Ok(Some(location)) => HttpResponse::Ok().json(location),
        Ok(None) => error_response(&RecommendError::NotFound(format!("location {}", id))),
        Err(e) => error_response(&RecommendError::from(e)),
    }
}

/// Business type listing endpoint
///
/// GET /api/v1/business-types
async fn list_business_types(state: web::Data<AppState>) -> impl Responder {
    match state.reference.list_business_types().await {
        Ok(business_types) => HttpResponse::Ok().json(business_types),
        Err(e) => error_response(&RecommendError::from(e)),
    }
}

/// Region listing endpoint
///
/// GET /api/v1/regions
async fn list_regions(state: web::Data<AppState>) -> impl Responder {
    match state.reference.list_regions().await {
        Ok(regions) => HttpResponse::Ok().json(regions),
        Err(e) => error_response(&RecommendError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recommender;
    use crate::models::{BusinessType, GeoPoint, Location, Region};
    use crate::routes::configure_routes;
    use crate::services::{InMemoryLocationIndex, InMemoryReferenceStore};
    use actix_web::{http::StatusCode, test, App};
    use chrono::Utc;
    use std::sync::Arc;

    async fn state() -> AppState {
        let reference = Arc::new(InMemoryReferenceStore::new());
        for (id, name) in [("b", "Bakery"), ("a", "Coffee shop")] {
            reference
                .insert_business_type(BusinessType {
                    id: id.into(),
                    name: name.into(),
                    description: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await;
        }
        reference
            .insert_region(Region {
                id: "R1".into(),
                name: "Region one".into(),
                parent_region_id: None,
                center_latitude: None,
                center_longitude: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;

        let index = Arc::new(InMemoryLocationIndex::new());
        index
            .insert(Location {
                id: "loc-1".into(),
                name: "Corner".into(),
                address: Some("1 Main St".into()),
                location: GeoPoint::new(1.0, 1.0),
                region_id: "R1".into(),
                business_types: vec![],
                tags: vec!["corner".into()],
                description: None,
            })
            .await;

        let recommender = Recommender::with_defaults(reference.clone(), index.clone());
        AppState::new(recommender, reference, index)
    }

    #[actix_web::test]
    async fn test_get_location() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state().await))
                .configure(configure_routes),
        )
        .await;

        let found: Location = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/locations/loc-1").to_request(),
        )
        .await;
        assert_eq!(found.address.as_deref(), Some("1 Main St"));

        let missing = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/locations/loc-9").to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_listings_and_health() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state().await))
                .configure(configure_routes),
        )
        .await;

        let types: Vec<BusinessType> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/business-types").to_request(),
        )
        .await;
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bakery", "Coffee shop"]);

        let regions: Vec<Region> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/regions").to_request(),
        )
        .await;
        assert_eq!(regions.len(), 1);

        let health: HealthResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/health").to_request(),
        )
        .await;
        assert_eq!(health.status, "healthy");
    }

    #[actix_web::test]
    async fn test_lookup_routes_reject_other_methods() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state().await))
                .configure(configure_routes),
        )
        .await;

        for uri in ["/api/v1/regions", "/api/v1/business-types", "/api/v1/locations/loc-1", "/api/v1/health"] {
            let resp = test::call_service(&app, test::TestRequest::post().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        }

        let unknown = test::call_service(&app, test::TestRequest::get().uri("/api/v1/nowhere").to_request()).await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }
}
