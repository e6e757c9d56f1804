// Endpoint names must be shown so readers know what was measured
use super::{CheckContext, ComplianceCheck};
use crate::patterns::normalize_phrase;
use shared_types::{ComplianceFlag, FlagKind, FlagLocation, Severity};
use std::collections::HashSet;

/// Endpoints-surfaced: each distinct non-empty endpoint must appear in the
/// visible text (case- and whitespace-insensitive, at word boundaries).
pub struct EndpointsSurfaced;

impl ComplianceCheck for EndpointsSurfaced {
    fn name(&self) -> &'static str {
        "endpoints_surfaced"
    }

    fn kind(&self) -> FlagKind {
        FlagKind::EndpointMissing
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag> {
        let mut seen = HashSet::new();

        ctx.claims
            .iter()
            .map(|c| c.endpoint.trim())
            .filter(|e| {
                let key = normalize_phrase(e);
                !key.is_empty() && seen.insert(key)
            })
            .filter(|e| !ctx.tokens.contains_phrase(e))
            .map(|e| {
                self.flag(
                    format!("Endpoint not found in rendered text: {}", e),
                    Some(FlagLocation::text(e)),
                )
            })
            .collect()
    }
}
