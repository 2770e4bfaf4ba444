use crate::analyzer::config::DiscoveryConfig;
use crate::analyzer::formatter::OutputFormat;
use crate::analyzer::quantity::Scale;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub aggregation: AggregationConfig,
    pub output: OutputConfig,
}

/// Aggregation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Abort on the first failing document
    pub fail_fast: bool,
    /// Process files on all cores
    pub parallel: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            parallel: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// SI suffix memory is reported in: "", "k", "M", "G", ...
    pub memory_scale: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            memory_scale: "M".to_string(),
        }
    }
}

impl OutputConfig {
    /// The configured memory scale.
    pub fn memory_scale(&self) -> Result<Scale, ConfigError> {
        Scale::from_suffix(&self.memory_scale).ok_or_else(|| ConfigError::InvalidValue {
            field: "output.memory_scale",
            value: self.memory_scale.clone(),
        })
    }
}
