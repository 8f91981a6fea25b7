// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::workflows::{RunOutcome, Workflow};

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    /// Partial config merged over the command-line config.
    #[serde(default)]
    pub global: Value,
    pub operations: Vec<Operation>,
}

impl BatchConfig {
    /// `base` with the `global` section laid over it, field by field.
    pub fn global_config(&self, base: &Config) -> Result<Config> {
        let mut merged = serde_json::to_value(base)?;
        merge_json(&mut merged, &self.global);
        let config: Config = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }
}

/// Objects merge recursively; any other value replaces the base. `null` is ignored.
fn merge_json(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (_, Value::Null) => {}
        (base, value) => *base = value.clone(),
    }
}

/// One analysis with optional overrides on top of `global`.
#[derive(Deserialize, Serialize, Debug)]
pub struct Operation {
    #[serde(rename = "type")]
    pub workflow: Workflow,
    /// Single scene for chlorophyll/turbidity.
    pub input: Option<PathBuf>,
    /// Three dates, oldest first, for mangrove.
    pub inputs: Option<Vec<PathBuf>>,
    pub output_dir: Option<PathBuf>,
    /// Mask cutoff (NDWI for water workflows, NDVI for mangrove).
    pub threshold: Option<f32>,
}

impl Operation {
    /// The global config with this operation's overrides applied.
    pub fn resolve(&self, global: &Config) -> Result<Config> {
        let mut config = global.clone();
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }

        match self.workflow {
            Workflow::Chlorophyll => {
                if let Some(input) = &self.input {
                    config.chlorophyll.input = input.clone();
                }
                if let Some(t) = self.threshold {
                    config.chlorophyll.water_threshold = t;
                }
            }
            Workflow::Turbidity => {
                if let Some(input) = &self.input {
                    config.turbidity.input = input.clone();
                }
                if let Some(t) = self.threshold {
                    config.turbidity.water_threshold = t;
                }
            }
            Workflow::Mangrove => {
                if self.input.is_some() {
                    return Err(anyhow::anyhow!(
                        "mangrove takes \"inputs\" (three dates), not \"input\""
                    ));
                }
                if let Some(inputs) = &self.inputs {
                    if inputs.len() != config.mangrove.inputs.len() {
                        return Err(anyhow::anyhow!(
                            "mangrove needs exactly {} inputs, got {}",
                            config.mangrove.inputs.len(),
                            inputs.len()
                        ));
                    }
                    for (dated, path) in config.mangrove.inputs.iter_mut().zip(inputs) {
                        dated.path = path.clone();
                    }
                }
                if let Some(t) = self.threshold {
                    config.mangrove.vegetation_threshold = t;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn load_batch(config_path: &Path) -> Result<BatchConfig> {
    let config_content = fs::read_to_string(config_path)?;
    let config: BatchConfig = serde_json::from_str(&config_content)?;
    Ok(config)
}

/// Run every operation in order on top of `base`. A missing input skips
/// that operation and a mangrove failure is logged and recorded; any other
/// failure stops the batch.
pub fn process_batch(
    config_path: &Path,
    base: &Config,
) -> Result<Vec<(Workflow, crate::Result<RunOutcome>)>> {
    let batch = load_batch(config_path)?;
    let global = batch.global_config(base)?;
    let total = batch.operations.len();

    log::info!("Starting batch processing with {} operations...", total);

    let mut outcomes = Vec::with_capacity(total);
    for (i, op) in batch.operations.iter().enumerate() {
        log::info!("[{}/{}] Processing {}", i + 1, total, op.workflow.name());

        let config = op.resolve(&global)?;
        let outcome = match op.workflow.run(&config) {
            Ok(outcome) => {
                if let RunOutcome::MissingInput(path) = &outcome {
                    log::warn!("[{}/{}] Skipped: {} not found", i + 1, total, path.display());
                }
                Ok(outcome)
            }
            Err(e) if op.workflow == Workflow::Mangrove => {
                log::error!("ERROR: {}", e);
                Err(e)
            }
            Err(e) => return Err(e.into()),
        };
        outcomes.push((op.workflow, outcome));
    }

    log::info!("Batch processing complete!");
    Ok(outcomes)
}
