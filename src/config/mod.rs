//! Configuration types for the track pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the raw recording input format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter of the raw recording file
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Whether the first row is a header to skip
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_has_header() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: default_has_header(),
        }
    }
}

/// Configuration for the stratified dataset split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of each class reserved for the test set
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Fraction of each class reserved for the validation set
    #[serde(default = "default_val_ratio")]
    pub val_ratio: f64,
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_val_ratio() -> f64 {
    0.2
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_ratio: default_test_ratio(),
            val_ratio: default_val_ratio(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub split: SplitConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
