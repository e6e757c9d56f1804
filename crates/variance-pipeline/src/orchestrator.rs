//! Batch orchestration: one claim set, several rendered variants
//!
//! Every variant is validated on its own rayon task. A variant that failed to
//! render, or whose markup the engine rejects, is recorded as a failure for
//! that variant only; the rest of the batch still completes.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::gate::CompletenessGate;
use compliance_engine::ComplianceEngine;
use rayon::prelude::*;
use shared_types::{ClaimSet, VariantKind, VariantResult};
use std::collections::HashSet;
use tracing::{info, warn};

/// What the rendering step produced for one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Rendered(String),
    Failed(String),
}

/// How one variant fared in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantStatus {
    Validated(VariantResult),
    GenerationFailed { reason: String },
    ValidationFailed { rendered: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutcome {
    pub variant: VariantKind,
    pub status: VariantStatus,
}

impl VariantOutcome {
    pub fn result(&self) -> Option<&VariantResult> {
        match &self.status {
            VariantStatus::Validated(result) => Some(result),
            _ => None,
        }
    }

    /// Markup to persist, if any was produced
    pub fn rendered(&self) -> Option<&str> {
        match &self.status {
            VariantStatus::Validated(result) => Some(result.rendered()),
            VariantStatus::ValidationFailed { rendered, .. } => Some(rendered),
            VariantStatus::GenerationFailed { .. } => None,
        }
    }
}

/// Outcomes for a whole batch, in canonical variant order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    outcomes: Vec<VariantOutcome>,
}

impl BatchOutcome {
    pub fn outcomes(&self) -> &[VariantOutcome] {
        &self.outcomes
    }

    pub fn results(&self) -> impl Iterator<Item = &VariantResult> {
        self.outcomes.iter().filter_map(VariantOutcome::result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VariantOutcome> {
        self.outcomes.iter().filter(|o| o.result().is_none())
    }

    /// True when at least one variant was validated and every validated variant passed
    pub fn all_passed(&self) -> bool {
        let mut results = self.results().peekable();
        results.peek().is_some() && results.all(VariantResult::overall_passed)
    }
}

pub struct Orchestrator {
    engine: ComplianceEngine,
    gate: CompletenessGate,
    variants: Vec<VariantKind>,
}

impl Orchestrator {
    pub fn new(engine: ComplianceEngine, gate: CompletenessGate, variants: Vec<VariantKind>) -> Self {
        Self {
            engine,
            gate,
            variants,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            ComplianceEngine::with_config(config.engine.clone()),
            config.gate(),
            config.pipeline.variants.clone(),
        )
    }

    pub fn variants(&self) -> &[VariantKind] {
        &self.variants
    }

    /// Validate every expected variant against the claim set.
    ///
    /// Expected variants missing from `generated` count as generation
    /// failures. Fails only when the claim set is under-sized or the input
    /// names a variant twice or one that is not expected.
    pub fn run(
        &self,
        claims: &ClaimSet,
        generated: Vec<(VariantKind, Generation)>,
    ) -> Result<BatchOutcome, PipelineError> {
        self.gate.check(claims)?;

        let mut seen = HashSet::new();
        for (variant, _) in &generated {
            if !seen.insert(*variant) {
                return Err(PipelineError::DuplicateVariant(*variant));
            }
            if !self.variants.contains(variant) {
                return Err(PipelineError::VariantNotEnabled(*variant));
            }
        }

        let mut pending = generated;
        for variant in &self.variants {
            if !seen.contains(variant) {
                pending.push((
                    *variant,
                    Generation::Failed("no rendered output was produced".to_string()),
                ));
            }
        }

        let mut outcomes: Vec<VariantOutcome> = pending
            .into_par_iter()
            .map(|(variant, generation)| self.validate_one(claims, variant, generation))
            .collect();
        outcomes.sort_by_key(|o| o.variant);

        Ok(BatchOutcome { outcomes })
    }

    fn validate_one(
        &self,
        claims: &ClaimSet,
        variant: VariantKind,
        generation: Generation,
    ) -> VariantOutcome {
        let status = match generation {
            Generation::Failed(reason) => {
                warn!(%variant, %reason, "Variant generation failed");
                VariantStatus::GenerationFailed { reason }
            }
            Generation::Rendered(rendered) => match self.engine.validate(claims, &rendered) {
                Ok(report) => {
                    info!(
                        %variant,
                        passed = report.passed(),
                        errors = report.errors().count(),
                        warnings = report.warnings().count(),
                        "Variant validated"
                    );
                    VariantStatus::Validated(VariantResult::new(variant, rendered, report))
                }
                Err(e) => {
                    warn!(%variant, error = %e, "Variant validation failed");
                    VariantStatus::ValidationFailed {
                        rendered,
                        reason: e.to_string(),
                    }
                }
            },
        };

        VariantOutcome { variant, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims, passing_markup};
    use pretty_assertions::assert_eq;

    fn orchestrator(min_claims: usize) -> Orchestrator {
        Orchestrator::new(
            ComplianceEngine::new(),
            CompletenessGate::new(min_claims),
            VariantKind::ALL.to_vec(),
        )
    }

    fn all_rendered(markup: &str) -> Vec<(VariantKind, Generation)> {
        VariantKind::ALL
            .iter()
            .map(|k| (*k, Generation::Rendered(markup.to_string())))
            .collect()
    }

    #[test]
    fn test_gate_runs_before_validation() {
        let err = orchestrator(20)
            .run(&claims(3), all_rendered(&passing_markup()))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::InsufficientClaims {
                found: 3,
                required: 20
            }
        );
    }

    #[test]
    fn test_all_variants_validated_in_canonical_order() {
        let mut generated = all_rendered(&passing_markup());
        generated.reverse();

        let outcome = orchestrator(20).run(&claims(20), generated).unwrap();
        let order: Vec<_> = outcome.outcomes().iter().map(|o| o.variant).collect();
        assert_eq!(order, VariantKind::ALL.to_vec());
        assert_eq!(outcome.results().count(), 5);
        assert!(outcome.all_passed());
    }

    #[test]
    fn test_generation_failure_is_isolated() {
        let mut generated = all_rendered(&passing_markup());
        generated[1].1 = Generation::Failed("template error".to_string());

        let outcome = orchestrator(1).run(&claims(1), generated).unwrap();
        assert_eq!(outcome.results().count(), 4);
        assert!(outcome.all_passed());

        let failed: Vec<_> = outcome.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].variant, VariantKind::Timeline);
        assert_eq!(failed[0].rendered(), None);
    }

    #[test]
    fn test_validation_failure_is_isolated() {
        let mut generated = all_rendered(&passing_markup());
        generated[2].1 = Generation::Rendered("<p>36.2%</p><script>var data = [99];".to_string());

        let outcome = orchestrator(1).run(&claims(1), generated).unwrap();
        assert_eq!(outcome.results().count(), 4);
        let failed = outcome.failures().next().unwrap();
        assert_eq!(failed.variant, VariantKind::SpotlightCards);
        assert!(matches!(
            &failed.status,
            VariantStatus::ValidationFailed { reason, .. } if reason.contains("unterminated")
        ));
        assert!(failed.rendered().is_some());
    }

    #[test]
    fn test_missing_variant_counts_as_generation_failure() {
        let generated = vec![(
            VariantKind::Heatmap,
            Generation::Rendered(passing_markup()),
        )];
        let orchestrator = Orchestrator::new(
            ComplianceEngine::new(),
            CompletenessGate::new(1),
            vec![VariantKind::GroupedBar, VariantKind::Heatmap],
        );

        let outcome = orchestrator.run(&claims(1), generated).unwrap();
        assert_eq!(outcome.outcomes().len(), 2);
        assert!(matches!(
            outcome.outcomes()[0].status,
            VariantStatus::GenerationFailed { .. }
        ));
        assert!(outcome.outcomes()[1].result().is_some());
    }

    #[test]
    fn test_failing_variant_fails_batch() {
        let mut generated = all_rendered(&passing_markup());
        generated[4].1 = Generation::Rendered("<p>nothing here</p>".to_string());

        let outcome = orchestrator(1).run(&claims(1), generated).unwrap();
        assert!(!outcome.all_passed());
        assert!(!outcome.outcomes()[4].result().unwrap().overall_passed());
    }

    #[test]
    fn test_batch_without_validated_variants_is_not_a_pass() {
        let generated = VariantKind::ALL
            .iter()
            .map(|k| (*k, Generation::Failed("timeout".to_string())))
            .collect();
        let outcome = orchestrator(1).run(&claims(1), generated).unwrap();
        assert!(!outcome.all_passed());
    }

    #[test]
    fn test_rejects_duplicate_and_disabled_variants() {
        let dup = vec![
            (VariantKind::Heatmap, Generation::Rendered(String::new())),
            (VariantKind::Heatmap, Generation::Rendered(String::new())),
        ];
        assert_eq!(
            orchestrator(0).run(&claims(1), dup).unwrap_err(),
            PipelineError::DuplicateVariant(VariantKind::Heatmap)
        );

        let narrow = Orchestrator::new(
            ComplianceEngine::new(),
            CompletenessGate::new(0),
            vec![VariantKind::Timeline],
        );
        let extra = vec![(VariantKind::Heatmap, Generation::Rendered(String::new()))];
        assert_eq!(
            narrow.run(&claims(1), extra).unwrap_err(),
            PipelineError::VariantNotEnabled(VariantKind::Heatmap)
        );
    }
}
