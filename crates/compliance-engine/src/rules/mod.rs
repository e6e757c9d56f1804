//! Compliance check battery
//!
//! Each check compares the claim set against one tokenized variant and
//! returns the discrepancies it finds. Checks hold no state between calls and
//! run in the order [`default_checks`] declares them.

pub mod citations;
pub mod endpoints;
pub mod numbers;
pub mod qualifiers;
pub mod unexpected;

pub use citations::CitationsPresent;
pub use endpoints::EndpointsSurfaced;
pub use numbers::NumbersPresent;
pub use qualifiers::QualifiersSurfaced;
pub use unexpected::UnexpectedNumbers;

use crate::extractors::TokenizedText;
use crate::EngineConfig;
use shared_types::{ClaimSet, ComplianceFlag, FlagKind, FlagLocation, Severity};

/// Everything a check may look at for one variant
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub claims: &'a ClaimSet,
    /// Rendered markup as received
    pub rendered: &'a str,
    pub tokens: &'a TokenizedText,
    pub config: &'a EngineConfig,
}

/// Trait for compliance checks
pub trait ComplianceCheck: Send + Sync {
    /// Stable identifier recorded on every flag, e.g. "numbers_present"
    fn name(&self) -> &'static str;

    /// Kind of discrepancy this check reports
    fn kind(&self) -> FlagKind;

    /// Severity of every flag this check emits
    fn severity(&self) -> Severity;

    /// Run the check, returning flags in discovery order
    fn check(&self, ctx: &CheckContext<'_>) -> Vec<ComplianceFlag>;

    /// Build a flag attributed to this check
    fn flag(&self, message: String, location: Option<FlagLocation>) -> ComplianceFlag {
        ComplianceFlag {
            check_name: self.name().to_string(),
            kind: self.kind(),
            severity: self.severity(),
            message,
            location,
        }
    }
}

/// The standard battery, in declaration order
pub fn default_checks() -> Vec<Box<dyn ComplianceCheck>> {
    vec![
        Box::new(NumbersPresent),
        Box::new(CitationsPresent),
        Box::new(UnexpectedNumbers),
        Box::new(QualifiersSurfaced),
        Box::new(EndpointsSurfaced),
    ]
}

#[cfg(test)]
pub(crate) fn run_check(
    check: &dyn ComplianceCheck,
    claims: &ClaimSet,
    rendered: &str,
) -> Vec<ComplianceFlag> {
    let tokens = TokenizedText::tokenize(rendered).unwrap();
    let config = EngineConfig::default();
    check.check(&CheckContext {
        claims,
        rendered,
        tokens: &tokens,
        config: &config,
    })
}
