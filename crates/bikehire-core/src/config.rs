use std::env;
use std::path::PathBuf;

use crate::error::{PipelineError, Result};

/// Relative locations of the raw inputs under the input root.
pub const STATIONS_INPUT_GLOB: &str = "infrastructure/*.csv";
pub const JOURNEYS_INPUT_GLOB: &str = "journey/**/*.csv";
pub const WEATHER_INPUT_GLOB: &str = "weather/*.json";

/// Relative locations of the parquet outputs under the output root. The COPY
/// statements use the same relative paths under the copy-source prefix.
pub const DOCKING_STATIONS_DIR: &str = "infrastructure/docking_stations";
pub const TIME_DIR: &str = "time";
pub const JOURNEYS_DIR: &str = "journeys";
pub const JOURNEY_DISTANCES_DIR: &str = "journey_distances";
pub const WEATHER_DIR: &str = "weather";

/// Runtime configuration, built once at process start and passed into every
/// stage and the loader. Object-storage credentials are deliberately not
/// modelled here; they stay ambient process environment for the engines that
/// need them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory holding the raw station/journey/weather files.
    pub input_root: PathBuf,
    /// Root directory the partitioned parquet outputs are written under.
    pub output_root: PathBuf,
    /// URI prefix the warehouse bulk-copies the parquet outputs from,
    /// e.g. `s3://lnd-bikehire/`.
    pub copy_source_root: String,
    /// Role identifier the warehouse assumes for the bulk copy.
    pub iam_role_arn: String,
    /// Warehouse connection string.
    pub database_url: String,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            input_root: PathBuf::from(require_var("BIKEHIRE_INPUT_DATA")?),
            output_root: PathBuf::from(require_var("BIKEHIRE_OUTPUT_DATA")?),
            copy_source_root: require_var("BIKEHIRE_COPY_SOURCE")?,
            iam_role_arn: require_var("BIKEHIRE_IAM_ROLE_ARN")?,
            database_url: require_var("DATABASE_URL")?,
        })
    }

    pub fn stations_output(&self) -> PathBuf {
        self.output_root.join(DOCKING_STATIONS_DIR)
    }

    pub fn time_output(&self) -> PathBuf {
        self.output_root.join(TIME_DIR)
    }

    pub fn journeys_output(&self) -> PathBuf {
        self.output_root.join(JOURNEYS_DIR)
    }

    pub fn journey_distances_output(&self) -> PathBuf {
        self.output_root.join(JOURNEY_DISTANCES_DIR)
    }

    pub fn weather_output(&self) -> PathBuf {
        self.output_root.join(WEATHER_DIR)
    }

    /// Expand one of the input glob patterns against the input root, sorted
    /// for deterministic read order.
    pub fn input_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let full_pattern = self.input_root.join(pattern);
        let full_pattern = full_pattern
            .to_str()
            .ok_or_else(|| PipelineError::Config("input root is not valid UTF-8".to_string()))?;

        let mut paths = Vec::new();
        for entry in glob::glob(full_pattern)? {
            paths.push(entry?);
        }
        paths.sort();
        Ok(paths)
    }
}

fn require_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| PipelineError::Config(format!("{} must be set", name)))
}
