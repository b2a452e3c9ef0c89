//! JSON reports of optimization results

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::strategy::OptimizationResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub scenario: &'a str,
    pub generated_at: String,
    pub missing_buildings: &'a [String],
    pub result: &'a OptimizationResult,
}

/// Writes one report per scenario and strategy under `output_dir`.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn write(
        &self,
        scenario: &str,
        missing_buildings: &[String],
        result: &OptimizationResult,
    ) -> Result<PathBuf> {
        let dir = self.output_dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        let report = Report {
            scenario,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            missing_buildings,
            result,
        };
        let path = dir.join(format!("{}.json", result.strategy));
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(path)
    }
}
