// Every number a claim states must be visible in the variant
use super::{CheckContext, ComplianceCheck};
use crate::extractors::numbers_in;
use shared_types::{ComplianceFlag, FlagKind, FlagLocation, Severity};
use std::collections::HashSet;

/// Numbers-present: each distinct value in a claim's `statistic` or
/// `sample_size` needs a matching numeric token in the rendered text.
pub struct NumbersPresent;

impl ComplianceCheck for NumbersPresent {
    fn name(&self) -> &'static str {
        "numbers_present"
    }

    fn kind(&self) -> FlagKind {
        FlagKind::NumberMissing
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag> {
        let mut flags = Vec::new();
        let mut seen = HashSet::new();

        for (index, claim) in ctx.claims.iter().enumerate() {
            let fields = [
                ("statistic", claim.statistic.as_str()),
                ("sample size", claim.sample_size.as_str()),
            ];

            for (field, value) in fields {
                for number in numbers_in(value) {
                    if !seen.insert(number.token.clone()) {
                        continue;
                    }
                    if ctx.tokens.has_number(&number.token) {
                        continue;
                    }

                    flags.push(self.flag(
                        format!(
                            "Source {} {} from claim #{} ({}) not found in rendered text",
                            field,
                            number.raw.trim(),
                            index + 1,
                            claim.label()
                        ),
                        Some(FlagLocation::text(number.raw.trim())),
                    ));
                }
            }
        }

        flags
    }
}
