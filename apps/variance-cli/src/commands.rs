//! Subcommand implementations, kept free of process concerns so they can be tested

use anyhow::{Context, Result};
use compliance_engine::{partition_claims, ComplianceEngine, EngineConfig};
use shared_types::{ClaimSet, ExtractionResult, VariantKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use variance_pipeline::{
    persist_batch, BatchOutcome, Generation, Orchestrator, PipelineConfig, VariantStatus,
};

/// Parse a `kind=path` variant argument
pub fn parse_variant_arg(s: &str) -> Result<(VariantKind, PathBuf), String> {
    let (kind, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KIND=PATH, got '{}'", s))?;
    if path.trim().is_empty() {
        return Err(format!("missing path for variant '{}'", kind));
    }
    Ok((kind.parse()?, PathBuf::from(path.trim())))
}

/// Load an extraction document and drop malformed claims
pub fn load_claims(path: &Path) -> Result<ClaimSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read claims file: {}", path.display()))?;
    let extraction: ExtractionResult = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse claims file: {}", path.display()))?;

    let (claims, rejected) = partition_claims(extraction.claims);
    if !rejected.is_empty() {
        warn!(rejected = rejected.len(), kept = claims.len(), "Dropped malformed claims");
    }
    Ok(claims)
}

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

#[derive(Debug)]
pub struct CheckOutput {
    pub json: String,
    pub passed: bool,
}

/// Validate one rendered file and render its report as JSON
pub fn check(
    claims_path: &Path,
    variant: VariantKind,
    rendered_path: &Path,
    engine_config: EngineConfig,
) -> Result<CheckOutput> {
    let claims = load_claims(claims_path)?;
    let rendered = fs::read(rendered_path)
        .with_context(|| format!("Failed to read rendered file: {}", rendered_path.display()))?;

    let report = ComplianceEngine::with_config(engine_config)
        .validate_bytes(&claims, &rendered)
        .with_context(|| format!("Cannot validate {} ({})", rendered_path.display(), variant))?;
    info!(%variant, passed = report.passed(), flags = report.flags().len(), "Checked variant");

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    Ok(CheckOutput {
        json,
        passed: report.passed(),
    })
}

#[derive(Debug)]
pub struct RunOutput {
    pub outcome: BatchOutcome,
    pub written: Vec<PathBuf>,
}

/// Validate a batch of rendered files and persist everything to `out_dir`
pub fn run(
    claims_path: &Path,
    variants: &[(VariantKind, PathBuf)],
    config: &PipelineConfig,
    out_dir: &Path,
) -> Result<RunOutput> {
    let claims = load_claims(claims_path)?;

    let generated: Vec<(VariantKind, Generation)> = variants
        .iter()
        .map(|(kind, path)| {
            let generation = match fs::read_to_string(path) {
                Ok(markup) => Generation::Rendered(markup),
                Err(e) => Generation::Failed(format!("cannot read {}: {}", path.display(), e)),
            };
            (*kind, generation)
        })
        .collect();

    let outcome = Orchestrator::from_config(config).run(&claims, generated)?;
    let written = persist_batch(out_dir, &claims, &outcome)?;

    Ok(RunOutput { outcome, written })
}

/// One line per variant for the terminal
pub fn summarize(outcome: &BatchOutcome) -> String {
    let mut lines: Vec<String> = outcome
        .outcomes()
        .iter()
        .map(|o| {
            let status = match &o.status {
                VariantStatus::Validated(result) => {
                    let report = result.report();
                    format!(
                        "{} ({} errors, {} warnings)",
                        if result.overall_passed() { "PASSED" } else { "FAILED" },
                        report.errors().count(),
                        report.warnings().count()
                    )
                }
                VariantStatus::GenerationFailed { reason } => format!("GENERATION FAILED: {}", reason),
                VariantStatus::ValidationFailed { reason, .. } => {
                    format!("VALIDATION FAILED: {}", reason)
                }
            };
            format!("{:<16} {}", o.variant.as_str(), status)
        })
        .collect();

    lines.push(format!(
        "overall: {}",
        if outcome.all_passed() { "PASSED" } else { "FAILED" }
    ));
    lines.join("\n")
}
