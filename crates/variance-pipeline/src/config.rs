//! Configuration parsing for pipeline runs
//!
//! This module provides TOML-based configuration for a validation batch:
//! the completeness threshold, where outputs land, which variants are
//! expected, and the tunables handed to the compliance engine.

use crate::gate::{CompletenessGate, DEFAULT_MIN_CLAIMS};
use anyhow::Context;
use compliance_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use shared_types::VariantKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Batch-level settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Check battery tunables
    #[serde(default)]
    pub engine: EngineConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - A variant name is not one of the known rendering styles
    ///
    /// # Example
    ///
    /// ```no_run
    /// use variance_pipeline::config::PipelineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = PipelineConfig::from_file("pipeline.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use variance_pipeline::config::PipelineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [pipeline]
    ///     min_claims = 5
    ///     variants = ["grouped_bar", "heatmap"]
    ///
    ///     [engine]
    ///     ignored_percentages = ["0", "100"]
    /// "#;
    /// let config = PipelineConfig::from_str(toml)?;
    /// assert_eq!(config.pipeline.min_claims, 5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    pub fn gate(&self) -> CompletenessGate {
        CompletenessGate::new(self.pipeline.min_claims)
    }
}

/// Batch-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Minimum claim count for a complete extraction (default: 20)
    #[serde(default = "default_min_claims")]
    pub min_claims: usize,
    /// Directory that receives persisted outputs (default: outputs)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Variants expected in every batch (default: all five)
    #[serde(default = "default_variants")]
    pub variants: Vec<VariantKind>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_claims: default_min_claims(),
            output_dir: default_output_dir(),
            variants: default_variants(),
        }
    }
}

fn default_min_claims() -> usize {
    DEFAULT_MIN_CLAIMS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_variants() -> Vec<VariantKind> {
    VariantKind::ALL.to_vec()
}
