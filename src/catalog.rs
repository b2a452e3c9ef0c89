//! Building definitions looked up by name and expanded into instances

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::{Building, BuildingError, BuildingId, BuildingRecord};

/// Source of building definitions keyed by their human-readable name.
pub trait BuildingLookup {
    fn find_by_name(&self, name: &str) -> Option<&BuildingRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: HashMap<String, BuildingRecord>,
}

impl Catalog {
    pub fn new(records: impl IntoIterator<Item = BuildingRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.name.clone(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BuildingLookup for Catalog {
    fn find_by_name(&self, name: &str) -> Option<&BuildingRecord> {
        self.records.get(name)
    }
}

/// A requested number of copies of one named building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRequest {
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no buildings resolved from the requests (missing: [{}])", .0.join(", "))]
    NothingFound(Vec<String>),
    #[error(transparent)]
    Building(#[from] BuildingError),
}

/// Expanded building instances plus the names that could not be resolved.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBuildings {
    pub buildings: Vec<Building>,
    pub missing: Vec<String>,
}

/// Turns requests into individual buildings with ids `<recordId>-<n>`, in
/// request order. Unknown names are reported rather than treated as errors.
pub fn expand_requests(
    lookup: &impl BuildingLookup,
    requests: &[BuildingRequest],
) -> Result<ResolvedBuildings, CatalogError> {
    let mut resolved = ResolvedBuildings::default();
    let mut next_index: HashMap<&str, u32> = HashMap::new();

    for request in requests {
        let Some(record) = lookup.find_by_name(&request.name) else {
            if !resolved.missing.contains(&request.name) {
                warn!("building '{}' not found in catalog", request.name);
                resolved.missing.push(request.name.clone());
            }
            continue;
        };
        let counter = next_index.entry(record.id.as_str()).or_insert(0);
        for _ in 0..request.count {
            *counter += 1;
            let id = BuildingId::new(format!("{}-{}", record.id, counter));
            resolved.buildings.push(record.to_building(id)?);
        }
    }

    if resolved.buildings.is_empty() {
        return Err(CatalogError::NothingFound(resolved.missing));
    }
    Ok(resolved)
}
