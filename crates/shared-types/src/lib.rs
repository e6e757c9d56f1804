pub mod types;

pub use types::{
    Claim, ClaimSet, ComplianceFlag, ComplianceReport, ExtractionResult, FlagKind, FlagLocation,
    Severity, VariantKind, VariantResult,
};
