use std::collections::{BTreeSet, VecDeque};

use crate::core::error::RecommendError;
use crate::models::Region;
use crate::services::ReferenceStore;

/// Target region plus the ids of every region beneath it
#[derive(Debug, Clone)]
pub struct RegionScope {
    root: Region,
    ids: BTreeSet<String>,
}

impl RegionScope {
    pub fn root(&self) -> &Region {
        &self.root
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.ids.contains(region_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Region ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }
}

/// Expand a region into itself and all of its descendants
///
/// Breadth-first over `get_region_children`, one level at a time. Seeing a
/// region twice means the hierarchy has a cycle; descending more than
/// `max_depth` levels is treated the same way so malformed data can never
/// keep the traversal running.
pub async fn expand_region<S>(
    store: &S,
    region_id: &str,
    max_depth: usize,
) -> Result<RegionScope, RecommendError>
where
    S: ReferenceStore + ?Sized,
{
    let root = store
        .get_region(region_id)
        .await?
        .ok_or_else(|| RecommendError::NotFound(format!("region {}", region_id)))?;

    let mut ids = BTreeSet::new();
    ids.insert(root.id.clone());

    let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
    frontier.push_back((root.id.clone(), 0));

    while let Some((current, depth)) = frontier.pop_front() {
        let children = store.get_region_children(&current).await?;
        if children.is_empty() {
            continue;
        }

        if depth >= max_depth {
            return Err(RecommendError::DataIntegrity(format!(
                "region hierarchy under {} exceeds {} levels",
                root.id, max_depth
            )));
        }

        for child in children {
            if !ids.insert(child.id.clone()) {
                return Err(RecommendError::DataIntegrity(format!(
                    "cycle in region hierarchy: {} reached twice (via {})",
                    child.id, current
                )));
            }
            frontier.push_back((child.id, depth + 1));
        }
    }

    tracing::debug!("Region {} expanded to {} regions", root.id, ids.len());

    Ok(RegionScope { root, ids })
}
