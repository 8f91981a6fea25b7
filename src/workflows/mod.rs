// src/workflows/mod.rs
//! End-to-end analyses: read, compute, mask, render, export.

pub mod chlorophyll;
pub mod mangrove;
pub mod turbidity;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::geo::GeoExtent;
use crate::processing::{ClassHistogram, MaskedStatistics};

/// What a workflow wrote and what it measured.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workflow: &'static str,
    pub layout: PathBuf,
    pub manifest: PathBuf,
    pub raster: PathBuf,
    pub extent: GeoExtent,
    pub statistics: Option<MaskedStatistics>,
    pub classes: Option<ClassHistogram>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// An input raster did not exist; nothing was written.
    MissingInput(PathBuf),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::MissingInput(_) => None,
        }
    }
}

/// The analyses the CLI and batch files can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    Chlorophyll,
    Turbidity,
    Mangrove,
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::Chlorophyll => "chlorophyll",
            Workflow::Turbidity => "turbidity",
            Workflow::Mangrove => "mangrove",
        }
    }

    pub fn run(&self, config: &Config) -> Result<RunOutcome> {
        match self {
            Workflow::Chlorophyll => chlorophyll::run(config),
            Workflow::Turbidity => turbidity::run(config),
            Workflow::Mangrove => mangrove::run(config),
        }
    }
}

/// First path that does not exist, logged the way a missing scene is reported.
fn first_missing<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let missing = paths.into_iter().find(|p| !p.exists())?;
    log::error!("ERROR: Input file not found at {}", missing.display());
    log::error!("Please check your data folder and filename.");
    Some(missing.to_path_buf())
}

fn prepare_output_dir(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.output_dir)?;
    Ok(())
}
