use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    building::BuildingRecord,
    catalog::{expand_requests, BuildingRequest, Catalog, ResolvedBuildings},
    config::{PlotConfiguration, RawPlotConfiguration},
    grid::Position,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub plots: RawPlotConfiguration,
    pub catalog: Vec<BuildingRecord>,
    pub requests: Vec<BuildingRequest>,
    /// Roads laid before placement; empty means the road layout is searched.
    #[serde(default)]
    pub roads: Vec<Position>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn plot_configuration(&self) -> Result<PlotConfiguration> {
        self.plots
            .validate()
            .with_context(|| format!("Scenario '{}' has an invalid plot layout", self.name))
    }

    pub fn building_catalog(&self) -> Catalog {
        Catalog::new(self.catalog.iter().cloned())
    }

    pub fn resolve_buildings(&self) -> Result<ResolvedBuildings> {
        expand_requests(&self.building_catalog(), &self.requests)
            .with_context(|| format!("Scenario '{}' requests no usable buildings", self.name))
    }
}
