// Hallucination check: rendered numbers must come from the claims
use super::{CheckContext, ComplianceCheck};
use crate::extractors::{numbers_in, NumericToken};
use shared_types::{Claim, ComplianceFlag, FlagKind, FlagLocation, Severity};
use std::collections::HashSet;

/// Unexpected-numbers: every number visible in the variant must trace back
/// to a number written in a source claim.
///
/// Values from `statistic` and `sample_size` vouch for any occurrence. Other
/// fields (timepoints, doses, endpoint thresholds, citation years and pages)
/// legitimately show up as plain numbers, so they vouch only when the value
/// is never rendered as a percentage: a "45%" does not trace to page 45.
/// Percent values listed in [`crate::EngineConfig::ignored_percentages`] are
/// skipped when every occurrence is written as a percentage (chart axes, "100%").
pub struct UnexpectedNumbers;

impl ComplianceCheck for UnexpectedNumbers {
    fn name(&self) -> &'static str {
        "unexpected_numbers"
    }

    fn kind(&self) -> FlagKind {
        FlagKind::UnexpectedNumber
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag> {
        let statistics: HashSet<NumericToken> =
            ctx.claims.iter().flat_map(statistic_numbers).collect();
        let context: HashSet<NumericToken> = ctx.claims.iter().flat_map(context_numbers).collect();
        let ignored = ctx.config.ignored_tokens();

        let mut flags = Vec::new();
        for occurrence in ctx.tokens.distinct_numbers() {
            let token = &occurrence.token;
            if statistics.contains(token) {
                continue;
            }

            let percent_only = ctx.tokens.occurrences_of(token).all(|o| o.percent);
            if percent_only && ignored.contains(token) {
                continue;
            }

            let offending = match ctx.tokens.occurrences_of(token).find(|o| o.percent) {
                None if context.contains(token) => continue,
                // Context values only excuse plain occurrences
                Some(percent) if context.contains(token) => percent,
                _ => occurrence,
            };

            let count = ctx.tokens.occurrences_of(token).count();
            flags.push(self.flag(
                format!(
                    "Number {} ({} occurrence{}) does not trace to any source claim: {}",
                    offending.display(),
                    count,
                    if count == 1 { "" } else { "s" },
                    ctx.tokens.snippet(offending)
                ),
                Some(FlagLocation::text(offending.display())),
            ));
        }

        flags
    }
}

/// Numbers a claim reports as results
fn statistic_numbers(claim: &Claim) -> Vec<NumericToken> {
    [claim.statistic.as_str(), claim.sample_size.as_str()]
        .into_iter()
        .flat_map(numbers_in)
        .map(|m| m.token)
        .collect()
}

/// Numbers that describe a claim rather than report a result
fn context_numbers(claim: &Claim) -> Vec<NumericToken> {
    let fields = [
        claim.context.as_str(),
        claim.timepoint.as_str(),
        claim.treatment_arm.as_str(),
        claim.citation.as_str(),
        claim.endpoint.as_str(),
    ];

    fields
        .into_iter()
        .chain(claim.qualifiers.iter().map(String::as_str))
        .flat_map(numbers_in)
        .map(|m| m.token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{claim, compliant_markup, sample_claims};
    use crate::rules::run_check;
    use shared_types::ClaimSet;

    #[test]
    fn test_flags_hallucinated_percentage() {
        let flags = run_check(
            &UnexpectedNumbers,
            &sample_claims(),
            "<p>36.2% and 23.0% and 45.0% response</p>",
        );
        assert_eq!(flags.len(), 1);
        let location = flags[0].location.as_ref().unwrap();
        assert_eq!(location.text, "45%");
        assert!(flags[0].message.contains("45%"));
    }

    #[test]
    fn test_ignores_100_and_0_percent() {
        let flags = run_check(
            &UnexpectedNumbers,
            &sample_claims(),
            "<p>36.2% and 23.0% on a 0% to 100% axis</p>",
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn test_plain_100_is_not_ignored() {
        let flags = run_check(&UnexpectedNumbers, &sample_claims(), "<p>36.2% of 100 patients</p>");
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].location.as_ref().unwrap().text, "100");
    }

    #[test]
    fn test_strips_style_and_script_blocks() {
        let flags = run_check(
            &UnexpectedNumbers,
            &sample_claims(),
            "<style>.x { width: 45.0%; }</style><script>var x = 45.0;</script><p>36.2% and 23.0%</p>",
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn test_numbers_from_any_claim_field_are_traceable() {
        assert!(run_check(&UnexpectedNumbers, &sample_claims(), &compliant_markup()).is_empty());
    }

    #[test]
    fn test_repeated_orphan_flagged_once_with_count() {
        let claims = ClaimSet::new(vec![claim("68%", "Study A", &[], "SALT50")]);
        let flags = run_check(&UnexpectedNumbers, &claims, "<p>70% then 70.0% again</p>");
        assert_eq!(flags.len(), 1);
        assert!(flags[0].message.contains("2 occurrences"));
    }

    #[test]
    fn test_percent_matching_a_dose_or_page_is_not_traceable() {
        let mut source = claim("36.2%", "Zhang X, et al. EADV 2022;12:45", &[], "SALT50");
        source.treatment_arm = "Ritlecitinib 50 mg QD".to_string();
        let claims = ClaimSet::new(vec![source]);

        let markup = "<p>Ritlecitinib 50 mg QD: 36.2% reached SALT50; 45% on placebo; 50% overall \
                      (Zhang X, et al. EADV 2022;12:45)</p>";
        let flags = run_check(&UnexpectedNumbers, &claims, markup);

        let flagged: Vec<_> = flags
            .iter()
            .map(|f| f.location.as_ref().unwrap().text.as_str())
            .collect();
        assert_eq!(flagged, vec!["50%", "45%"]);
    }

    #[test]
    fn test_context_numbers_trace_when_not_percentages() {
        let mut source = claim("36.2%", "King B, et al. Lancet 2023;401:1518", &[], "SALT ≤20");
        source.timepoint = "Week 24".to_string();
        let claims = ClaimSet::new(vec![source]);

        let markup = "<p>36.2% reached SALT ≤20 at Week 24 (King B, et al. Lancet 2023;401:1518)</p>";
        assert!(run_check(&UnexpectedNumbers, &claims, markup).is_empty());
    }

    #[test]
    fn test_sample_size_vouches_for_percent_form() {
        let mut source = claim("36.2%", "Study A", &[], "SALT50");
        source.sample_size = "n=45".to_string();
        let claims = ClaimSet::new(vec![source]);
        assert!(run_check(&UnexpectedNumbers, &claims, "<p>36.2% and 45% (n=45)</p>").is_empty());
    }

    #[test]
    fn test_location_carries_matched_text() {
        let claims = ClaimSet::new(vec![claim("68%", "Study A", &[], "SALT50")]);
        let flags = run_check(&UnexpectedNumbers, &claims, "<p>70.0 % achieved SALT50 (Study A)</p>");
        assert_eq!(flags[0].location.as_ref().unwrap().text, "70%");
        assert!(flags[0].message.contains("70.0 % achieved"));
    }
}
