//! TOML configuration deserialisation for convergence jobs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use chloride_core::convergence::DEFAULT_MAX_CAP;
use chloride_core::{ParameterKey, ParameterOverrides};

/// Top-level job configuration.
#[derive(Debug, Default, Deserialize)]
pub struct JobConfig {
    /// Optional key-value parameter file, relative to the job file.
    #[serde(default)]
    pub parameter_file: Option<PathBuf>,
    /// Inline overrides using parameter-file key names, e.g. `L1 = 45.0`.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Convergence tracker settings.
#[derive(Debug, Deserialize)]
pub struct ConvergenceConfig {
    /// Largest odd series depth to evaluate (default: 31).
    #[serde(default = "default_max_cap")]
    pub max_cap: u32,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_cap: default_max_cap(),
        }
    }
}

fn default_max_cap() -> u32 {
    DEFAULT_MAX_CAP
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the convergence table as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the report as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Inline `[parameters]` as typed overrides.
    ///
    /// Unlike parameter files, an unknown key here is an error.
    pub fn parameter_overrides(&self) -> Result<ParameterOverrides> {
        self.parameters
            .iter()
            .map(|(name, &value)| {
                let key: ParameterKey = name
                    .parse()
                    .with_context(|| format!("Invalid [parameters] entry '{}'", name))?;
                Ok::<_, anyhow::Error>((key, value))
            })
            .collect()
    }
}

/// Load and parse a TOML job configuration file.
///
/// A relative `parameter_file` is resolved against the job file's directory.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    if let (Some(file), Some(dir)) = (config.parameter_file.as_mut(), path.parent()) {
        if file.is_relative() {
            *file = dir.join(&*file);
        }
    }

    Ok(config)
}
