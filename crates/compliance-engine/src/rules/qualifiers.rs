// Study caveats should stay attached to the data they qualify
use super::{CheckContext, ComplianceCheck};
use crate::extractors::TokenizedText;
use crate::patterns::significant_keywords;
use shared_types::{ComplianceFlag, FlagKind, FlagLocation, Severity};

/// Qualifiers-surfaced: a claim with qualifiers must show at least one of
/// them. A qualifier counts as shown when its full phrase appears, or when
/// every one of its significant keywords appears as a word.
pub struct QualifiersSurfaced;

impl ComplianceCheck for QualifiersSurfaced {
    fn name(&self) -> &'static str {
        "qualifiers_surfaced"
    }

    fn kind(&self) -> FlagKind {
        FlagKind::QualifierMissing
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag> {
        let min_len = ctx.config.qualifier_min_keyword_len;
        let mut flags = Vec::new();

        for (index, claim) in ctx.claims.iter().enumerate() {
            let qualifiers: Vec<&str> = claim
                .qualifiers
                .iter()
                .map(|q| q.trim())
                .filter(|q| !q.is_empty())
                .collect();
            if qualifiers.is_empty() {
                continue;
            }

            let surfaced = qualifiers
                .iter()
                .any(|q| is_surfaced(ctx.tokens, q, min_len));
            if !surfaced {
                flags.push(self.flag(
                    format!(
                        "No qualifier for claim #{} ({}) found in rendered text: {}",
                        index + 1,
                        claim.label(),
                        qualifiers.join("; ")
                    ),
                    Some(FlagLocation::text(qualifiers[0])),
                ));
            }
        }

        flags
    }
}

fn is_surfaced(tokens: &TokenizedText, qualifier: &str, min_len: usize) -> bool {
    if tokens.contains_phrase(qualifier) {
        return true;
    }

    let keywords = significant_keywords(qualifier, min_len);
    !keywords.is_empty() && keywords.iter().all(|k| tokens.contains_word(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{claim, compliant_markup, sample_claims};
    use crate::rules::run_check;
    use shared_types::ClaimSet;

    #[test]
    fn test_flags_missing_qualifier_as_warning() {
        let flags = run_check(&QualifiersSurfaced, &sample_claims(), "<p>36.2% response rate</p>");
        assert_eq!(flags.len(), 2);
        assert!(flags.iter().all(|f| f.severity == Severity::Warning));
        assert!(flags[0].message.contains("Post hoc analysis"));
    }

    #[test]
    fn test_qualifier_case_insensitive() {
        let flags = run_check(
            &QualifiersSurfaced,
            &sample_claims(),
            "<p>POST HOC ANALYSIS and subgroup analysis results</p>",
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn test_one_qualifier_per_claim_is_enough() {
        let claims = ClaimSet::new(vec![claim(
            "12%",
            "Study A",
            &["Small sample size", "Open-label extension"],
            "X",
        )]);
        let flags = run_check(&QualifiersSurfaced, &claims, "<p>Open-label extension</p>");
        assert!(flags.is_empty());
    }

    #[test]
    fn test_keywords_match_reworded_qualifier() {
        let claims = ClaimSet::new(vec![claim("12%", "Study A", &["small sample size"], "X")]);
        let flags = run_check(
            &QualifiersSurfaced,
            &claims,
            "<p>Note: sample size was small.</p>",
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn test_one_warning_when_phrase_missing() {
        let claims = ClaimSet::new(vec![claim("68%", "Study A", &["small sample size"], "SALT50")]);
        let flags = run_check(&QualifiersSurfaced, &claims, "<p>68% achieved SALT50 (Study A)</p>");
        assert_eq!(flags.len(), 1);
        assert!(flags[0].message.contains("claim #1"));
    }

    #[test]
    fn test_claims_without_qualifiers_produce_nothing() {
        let claims = ClaimSet::new(vec![claim("68%", "Study A", &[], "SALT50")]);
        assert!(run_check(&QualifiersSurfaced, &claims, "<p></p>").is_empty());
    }

    #[test]
    fn test_compliant_markup_has_no_flags() {
        assert!(run_check(&QualifiersSurfaced, &sample_claims(), &compliant_markup()).is_empty());
    }
}
