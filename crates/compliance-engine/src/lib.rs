//! Compliance validation engine for rendered claim variants
//!
//! Reconciles a set of extracted claims against one rendered variant and
//! reports every discrepancy as a severity-tagged flag. Validation is a pure
//! function of its inputs: no I/O, no shared mutable state, so variants can
//! be validated in parallel and each call isolated on its own.

pub mod extractors;
pub mod patterns;
pub mod report;
pub mod rules;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extractors::{CitationToken, NumericToken, TokenizedText};
pub use report::{build_report, ReportBuilder, ReportError};
pub use rules::{default_checks, CheckContext, ComplianceCheck};
pub use schema::{partition_claims, validate_claims, ClaimError};

use serde::{Deserialize, Serialize};
use shared_types::{ClaimSet, ComplianceReport, VariantKind, VariantResult};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Errors that make a variant impossible to validate
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Malformed rendered text: {0}")]
    MalformedInput(String),

    #[error("Rendered text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Report assembly failed: {0}")]
    Report(#[from] ReportError),
}

/// Tunables for the check battery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Percent values treated as layout rather than data (chart axes, full bars)
    #[serde(default = "default_ignored_percentages")]
    pub ignored_percentages: Vec<String>,
    /// Shortest word that counts as a qualifier keyword
    #[serde(default = "default_qualifier_min_keyword_len")]
    pub qualifier_min_keyword_len: usize,
}

fn default_ignored_percentages() -> Vec<String> {
    vec!["0".to_string(), "100".to_string()]
}

fn default_qualifier_min_keyword_len() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ignored_percentages: default_ignored_percentages(),
            qualifier_min_keyword_len: default_qualifier_min_keyword_len(),
        }
    }
}

impl EngineConfig {
    /// Ignored percentages as normalized tokens; unparseable entries are skipped
    pub fn ignored_tokens(&self) -> HashSet<NumericToken> {
        self.ignored_percentages
            .iter()
            .filter_map(|p| NumericToken::parse(p))
            .collect()
    }
}

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    config: EngineConfig,
    checks: Vec<Box<dyn ComplianceCheck>>,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            checks: default_checks(),
        }
    }

    /// Run a custom battery; flags are reported in the order given
    pub fn with_checks(config: EngineConfig, checks: Vec<Box<dyn ComplianceCheck>>) -> Self {
        Self { config, checks }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Validate one rendered variant against the claim set.
    ///
    /// Missing or unexpected content is reported as flags; an `Err` means
    /// the rendered text itself could not be tokenized.
    pub fn validate(
        &self,
        claims: &ClaimSet,
        rendered: &str,
    ) -> Result<ComplianceReport, ComplianceError> {
        let tokens = TokenizedText::tokenize(rendered)?;
        let ctx = CheckContext {
            claims,
            rendered,
            tokens: &tokens,
            config: &self.config,
        };

        let mut builder = ReportBuilder::new();
        for check in &self.checks {
            let flags = check.check(&ctx);
            debug!(check = check.name(), flags = flags.len(), "Compliance check finished");
            builder.add_check(check.name(), flags)?;
        }

        Ok(builder.build())
    }

    /// Validate raw bytes, rejecting anything that is not UTF-8 text
    pub fn validate_bytes(
        &self,
        claims: &ClaimSet,
        rendered: &[u8],
    ) -> Result<ComplianceReport, ComplianceError> {
        let text = std::str::from_utf8(rendered)?;
        self.validate(claims, text)
    }

    /// Validate a variant and pair the verdict with its markup
    pub fn validate_variant(
        &self,
        variant: VariantKind,
        claims: &ClaimSet,
        rendered: String,
    ) -> Result<VariantResult, ComplianceError> {
        let report = self.validate(claims, &rendered)?;
        Ok(VariantResult::new(variant, rendered, report))
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate with the default battery and configuration
pub fn validate(claims: &ClaimSet, rendered: &str) -> Result<ComplianceReport, ComplianceError> {
    ComplianceEngine::new().validate(claims, rendered)
}
