use actix_web::{web, HttpResponse, Responder};
use tracing::Instrument;
use validator::Validate;

use crate::models::{ErrorResponse, RecommendRequest};
use crate::routes::{error_response, method_not_allowed, AppState};

/// Configure recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recommendations")
            .route(web::post().to(recommend_locations))
            .default_service(web::to(method_not_allowed)),
    );
}

/// Recommend locations endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "region": "string",
///   "business_type": "string",
///   "limit": 20
/// }
/// ```
async fn recommend_locations(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_argument".to_string(),
            message: "region and business_type are required".to_string(),
            status_code: 400,
        });
    }

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "recommend",
        %request_id,
        region = %req.region_id,
        business_type = %req.business_type_id
    );

    let result = state
        .recommender
        .recommend(&req)
        .instrument(span)
        .await;

    match result {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            tracing::info!("Recommendation {} failed: {}", request_id, e);
            error_response(&e)
        }
    }
}
