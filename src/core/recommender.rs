use std::sync::Arc;
use std::time::Duration;

use crate::core::{
    error::RecommendError,
    filters::reconcile_candidates,
    ranking::rank_locations,
    region::{expand_region, RegionScope},
    scoring::calculate_suitability_score,
};
use crate::models::{BusinessType, Location, LocationQuery, RecommendRequest, RecommendResult, ScoredLocation, ScoringModel};
use crate::services::{LocationIndex, ReferenceStore};

/// Bounds applied to every recommendation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendLimits {
    /// Limit used when the request omits it or sends zero
    pub default_limit: usize,
    /// Upper bound on the number of results per request
    pub max_limit: usize,
    /// Candidates requested from the index per result slot
    pub overfetch_factor: usize,
    /// Deepest region hierarchy the expansion will walk
    pub max_region_depth: usize,
    /// Deadline for the whole request, store calls included
    pub request_timeout: Duration,
}

impl Default for RecommendLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 200,
            overfetch_factor: 3,
            max_region_depth: 32,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl RecommendLimits {
    /// Zero or absent falls back to the default; anything else is clamped to
    /// `[1, max_limit]`
    pub fn normalize_limit(&self, requested: Option<u32>) -> usize {
        let max = self.max_limit.max(1);
        match requested {
            None | Some(0) => self.default_limit.clamp(1, max),
            Some(n) => (n as usize).clamp(1, max),
        }
    }

    pub fn fetch_count(&self, limit: usize) -> usize {
        limit.saturating_mul(self.overfetch_factor.max(1))
    }
}

/// Recommendation engine
///
/// Federates the reference store and the location index:
/// 1. Region expansion and business-type resolution (concurrently)
/// 2. Candidate search over the expanded region set
/// 3. Reconciliation of hits against the reference data
/// 4. Scoring, ranking and truncation
///
/// Holds only shared read handles, so a single instance serves all requests.
#[derive(Clone)]
pub struct Recommender {
    reference: Arc<dyn ReferenceStore>,
    index: Arc<dyn LocationIndex>,
    model: ScoringModel,
    limits: RecommendLimits,
}

impl Recommender {
    pub fn new(
        reference: Arc<dyn ReferenceStore>,
        index: Arc<dyn LocationIndex>,
        model: ScoringModel,
        limits: RecommendLimits,
    ) -> Self {
        Self {
            reference,
            index,
            model,
            limits,
        }
    }

    pub fn with_defaults(reference: Arc<dyn ReferenceStore>, index: Arc<dyn LocationIndex>) -> Self {
        Self::new(reference, index, ScoringModel::default(), RecommendLimits::default())
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    pub fn limits(&self) -> &RecommendLimits {
        &self.limits
    }

    /// Recommend locations for opening a business of the requested type
    ///
    /// Fails fast on the first store error; nothing is retried here. If the
    /// request deadline passes, in-flight store calls are dropped and no
    /// partial result is returned.
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResult, RecommendError> {
        let region_id = require_id("region", &request.region_id)?;
        let business_type_id = require_id("business_type", &request.business_type_id)?;
        let limit = self.limits.normalize_limit(request.limit);

        let timeout = self.limits.request_timeout;
        match tokio::time::timeout(timeout, self.run(region_id, business_type_id, limit)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Recommendation for region {} / type {} exceeded {:?}",
                    region_id,
                    business_type_id,
                    timeout
                );
                Err(RecommendError::DeadlineExceeded(timeout))
            }
        }
    }

    async fn run(
        &self,
        region_id: &str,
        business_type_id: &str,
        limit: usize,
    ) -> Result<RecommendResult, RecommendError> {
        // Independent reads; both must finish before the search
        let (scope, business_type) = tokio::try_join!(
            expand_region(self.reference.as_ref(), region_id, self.limits.max_region_depth),
            self.resolve_business_type(business_type_id),
        )?;

        let query = LocationQuery {
            region_ids: scope.ids().cloned().collect(),
            business_type_id: business_type.id.clone(),
            fetch_count: self.limits.fetch_count(limit),
        };

        let candidates = self.index.search_locations(&query).await?;
        let candidate_count = candidates.len();

        tracing::debug!(
            "Index returned {} candidates for {} regions (requested {})",
            candidate_count,
            query.region_ids.len(),
            query.fetch_count
        );

        let locations = self.score_candidates(candidates, &scope, &business_type);
        let ranked = rank_locations(locations, limit);

        tracing::info!(
            "Recommended {} locations for region {} / type {} (from {} candidates)",
            ranked.len(),
            region_id,
            business_type_id,
            candidate_count
        );

        Ok(RecommendResult {
            total: ranked.len(),
            locations: ranked,
            candidates: candidate_count,
        })
    }

    async fn resolve_business_type(&self, id: &str) -> Result<BusinessType, RecommendError> {
        self.reference
            .get_business_type(id)
            .await?
            .ok_or_else(|| RecommendError::NotFound(format!("business type {}", id)))
    }

    fn score_candidates(
        &self,
        candidates: Vec<Location>,
        scope: &RegionScope,
        business_type: &BusinessType,
    ) -> Vec<ScoredLocation> {
        let center = scope.root().center();

        reconcile_candidates(candidates, scope, &business_type.id)
            .into_iter()
            .map(|location| {
                let suitability = calculate_suitability_score(&location, business_type, center, &self.model);
                ScoredLocation {
                    location,
                    score: suitability.score,
                    distance_km: suitability.distance_km,
                }
            })
            .collect()
    }
}

fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str, RecommendError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecommendError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(trimmed)
}
