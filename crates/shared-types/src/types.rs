use serde::{Deserialize, Serialize};
use std::fmt;

/// One clinical data point extracted from a source document.
///
/// Claims are produced once by the extraction stage and only read afterwards.
/// Fields are public for construction and pattern matching, but every stage
/// receives claims behind shared references, so nothing downstream can edit
/// one in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Numeric value as originally phrased, e.g. "36.2%"
    pub statistic: String,
    /// Patient population or subgroup the statistic describes
    pub context: String,
    /// When the measurement was taken, e.g. "Week 24"
    pub timepoint: String,
    /// Treatment group including dosage, e.g. "Ritlecitinib 50 mg QD (n=130)"
    pub treatment_arm: String,
    /// Number of patients in the group, e.g. "n=130"
    pub sample_size: String,
    /// Full source reference
    pub citation: String,
    /// Study caveats, in source order
    #[serde(default)]
    pub qualifiers: Vec<String>,
    /// Clinical outcome measure, e.g. "SALT ≤20"
    pub endpoint: String,
}

impl Claim {
    /// Short human label used in flag messages
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.endpoint, &self.treatment_arm, &self.timepoint] {
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part);
            }
        }

        if parts.is_empty() {
            format!("statistic {}", self.statistic.trim())
        } else {
            parts.join(", ")
        }
    }
}

/// Ordered, read-only sequence of claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn into_inner(self) -> Vec<Claim> {
        self.claims
    }
}

impl From<Vec<Claim>> for ClaimSet {
    fn from(claims: Vec<Claim>) -> Self {
        Self::new(claims)
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}

/// Wire shape returned by the extraction service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub claims: ClaimSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks approval of the variant
    Error,
    /// Flagged for human review, never blocks
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Category of a discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    NumberMissing,
    CitationMissing,
    UnexpectedNumber,
    QualifierMissing,
    EndpointMissing,
}

/// Where in the rendered artifact a flag points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagLocation {
    /// Matched or expected text, e.g. "68%" or a citation string
    pub text: String,
}

impl FlagLocation {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One discrepancy found by a compliance check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub check_name: String,
    pub kind: FlagKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FlagLocation>,
}

impl ComplianceFlag {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Verdict for one rendered variant.
///
/// `passed` is derived from the flags and cannot be set directly. Reports
/// read back from JSON are re-checked, so a stored verdict that disagrees
/// with its flags is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReportRepr")]
pub struct ComplianceReport {
    passed: bool,
    flags: Vec<ComplianceFlag>,
}

impl ComplianceReport {
    /// Build a report from flags in battery order.
    ///
    /// Callers inside this workspace go through the engine's report builder,
    /// which validates flag data before calling this.
    pub fn from_flags(flags: Vec<ComplianceFlag>) -> Self {
        let passed = !flags.iter().any(ComplianceFlag::is_error);
        Self { passed, flags }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn flags(&self) -> &[ComplianceFlag] {
        &self.flags
    }

    pub fn errors(&self) -> impl Iterator<Item = &ComplianceFlag> {
        self.flags.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ComplianceFlag> {
        self.flags.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn flags_of(&self, kind: FlagKind) -> impl Iterator<Item = &ComplianceFlag> {
        self.flags.iter().filter(move |f| f.kind == kind)
    }
}

#[derive(Deserialize)]
struct ReportRepr {
    passed: bool,
    #[serde(default)]
    flags: Vec<ComplianceFlag>,
}

impl TryFrom<ReportRepr> for ComplianceReport {
    type Error = String;

    fn try_from(repr: ReportRepr) -> Result<Self, Self::Error> {
        let report = ComplianceReport::from_flags(repr.flags);
        if report.passed != repr.passed {
            return Err(format!(
                "report marked passed={} but its flags imply passed={}",
                repr.passed, report.passed
            ));
        }
        Ok(report)
    }
}

/// The rendering styles produced from one claim set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    GroupedBar,
    Timeline,
    SpotlightCards,
    Heatmap,
    Infographic,
}

impl VariantKind {
    pub const ALL: [VariantKind; 5] = [
        VariantKind::GroupedBar,
        VariantKind::Timeline,
        VariantKind::SpotlightCards,
        VariantKind::Heatmap,
        VariantKind::Infographic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::GroupedBar => "grouped_bar",
            VariantKind::Timeline => "timeline",
            VariantKind::SpotlightCards => "spotlight_cards",
            VariantKind::Heatmap => "heatmap",
            VariantKind::Infographic => "infographic",
        }
    }

    /// Position in the canonical ordering, used for output file names
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or_default()
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown variant type '{}' (expected one of: {})",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

/// A rendered variant paired with its compliance verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantResult {
    variant: VariantKind,
    #[serde(skip)]
    rendered: String,
    report: ComplianceReport,
    overall_passed: bool,
}

impl VariantResult {
    pub fn new(variant: VariantKind, rendered: String, report: ComplianceReport) -> Self {
        let overall_passed = report.passed();
        Self {
            variant,
            rendered,
            report,
            overall_passed,
        }
    }

    pub fn variant(&self) -> VariantKind {
        self.variant
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn report(&self) -> &ComplianceReport {
        &self.report
    }

    pub fn overall_passed(&self) -> bool {
        self.overall_passed
    }
}
