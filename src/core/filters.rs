use std::collections::HashSet;

use crate::core::region::RegionScope;
use crate::models::Location;

/// Reconcile raw index hits against the resolved reference data
///
/// The index is a separate store and may lag behind the reference data, so
/// every hit is checked again here:
/// - its region must be inside the expanded scope (this also drops hits whose
///   region no longer exists)
/// - it must carry a suitability entry for the requested business type
/// - ids must be unique; the first occurrence wins
pub fn reconcile_candidates(
    candidates: Vec<Location>,
    scope: &RegionScope,
    business_type_id: &str,
) -> Vec<Location> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut out_of_scope = 0usize;
    let mut wrong_type = 0usize;
    let mut duplicates = 0usize;

    let kept: Vec<Location> = candidates
        .into_iter()
        .filter(|location| {
            if !scope.contains(&location.region_id) {
                out_of_scope += 1;
                return false;
            }
            if location.suitability_for(business_type_id).is_none() {
                wrong_type += 1;
                return false;
            }
            if !seen.insert(location.id.clone()) {
                duplicates += 1;
                return false;
            }
            true
        })
        .collect();

    if out_of_scope + wrong_type + duplicates > 0 {
        tracing::warn!(
            "Dropped index hits for region {}: {} out of scope, {} without type {}, {} duplicates",
            scope.root().id,
            out_of_scope,
            wrong_type,
            business_type_id,
            duplicates
        );
    }

    kept
}
