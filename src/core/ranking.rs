use std::cmp::Ordering;

use crate::models::ScoredLocation;

/// Order two scored locations: score descending, then id ascending
#[inline]
pub fn compare_ranked(a: &ScoredLocation, b: &ScoredLocation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.location.id.cmp(&b.location.id))
}

/// Sort scored locations into their final order and keep the top `limit`
pub fn rank_locations(mut scored: Vec<ScoredLocation>, limit: usize) -> Vec<ScoredLocation> {
    scored.sort_by(compare_ranked);
    scored.truncate(limit);
    scored
}
