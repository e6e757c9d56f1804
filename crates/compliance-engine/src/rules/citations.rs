// Every source reference must be carried into the variant
use super::{CheckContext, ComplianceCheck};
use crate::extractors::CitationToken;
use crate::patterns::normalize_phrase;
use shared_types::{ComplianceFlag, FlagKind, FlagLocation, Severity};
use std::collections::HashSet;

/// Citations-present: each distinct non-empty citation must appear.
///
/// Literal references are matched as normalized phrases against the visible
/// text. A citation that is itself a reference marker ("[3]", "1, 2") must
/// be matched by a rendered marker instead.
pub struct CitationsPresent;

impl ComplianceCheck for CitationsPresent {
    fn name(&self) -> &'static str {
        "citations_present"
    }

    fn kind(&self) -> FlagKind {
        FlagKind::CitationMissing
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag> {
        let mut flags = Vec::new();
        let mut seen = HashSet::new();

        for claim in ctx.claims.iter() {
            let citation = claim.citation.trim();
            let key = normalize_phrase(citation);
            if key.is_empty() || !seen.insert(key) {
                continue;
            }

            let found = match CitationToken::parse_reference(citation) {
                Some(markers) => markers.iter().all(|m| ctx.tokens.has_citation(m)),
                None => ctx.tokens.contains_phrase(citation),
            };

            if !found {
                flags.push(self.flag(
                    format!("Citation not found in rendered text: {}", citation),
                    Some(FlagLocation::text(citation)),
                ));
            }
        }

        flags
    }
}
