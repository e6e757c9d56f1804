//! Defensive shape checks for claims coming from the extraction service
//!
//! The extractor is an external producer, so its output is checked before
//! validation relies on it. A claim is malformed when its statistic is empty
//! or carries no numeric value, or when a field holds control characters.
//! Empty citations and endpoints are allowed; the checks skip them.

use crate::extractors::numbers_in;
use shared_types::{Claim, ClaimSet};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("claim #{index}: statistic is empty")]
    EmptyStatistic { index: usize },

    #[error("claim #{index}: statistic '{statistic}' has no numeric value")]
    NonNumericStatistic { index: usize, statistic: String },

    #[error("claim #{index}: field '{field}' contains control characters")]
    ControlCharacters { index: usize, field: &'static str },
}

/// Check one claim; `index` is 1-based and only used in the error
pub fn validate_claim(index: usize, claim: &Claim) -> Result<(), ClaimError> {
    let fields: [(&'static str, &str); 7] = [
        ("statistic", claim.statistic.as_str()),
        ("context", claim.context.as_str()),
        ("timepoint", claim.timepoint.as_str()),
        ("treatment_arm", claim.treatment_arm.as_str()),
        ("sample_size", claim.sample_size.as_str()),
        ("citation", claim.citation.as_str()),
        ("endpoint", claim.endpoint.as_str()),
    ];

    let qualifiers = claim.qualifiers.iter().map(|q| ("qualifiers", q.as_str()));
    for (field, value) in fields.into_iter().chain(qualifiers) {
        if value.chars().any(|c| c.is_control() && !c.is_whitespace()) {
            return Err(ClaimError::ControlCharacters { index, field });
        }
    }

    if claim.statistic.trim().is_empty() {
        return Err(ClaimError::EmptyStatistic { index });
    }
    if numbers_in(&claim.statistic).is_empty() {
        return Err(ClaimError::NonNumericStatistic {
            index,
            statistic: claim.statistic.clone(),
        });
    }

    Ok(())
}

/// Every problem in a claim set, in claim order
pub fn validate_claims(claims: &ClaimSet) -> Vec<ClaimError> {
    claims
        .iter()
        .enumerate()
        .filter_map(|(i, claim)| validate_claim(i + 1, claim).err())
        .collect()
}

/// Split a claim set into well-formed claims and the errors for the rest
pub fn partition_claims(claims: ClaimSet) -> (ClaimSet, Vec<ClaimError>) {
    let mut accepted = Vec::with_capacity(claims.len());
    let mut rejected = Vec::new();

    for (i, claim) in claims.into_inner().into_iter().enumerate() {
        match validate_claim(i + 1, &claim) {
            Ok(()) => accepted.push(claim),
            Err(e) => {
                warn!("Rejecting malformed claim: {}", e);
                rejected.push(e);
            }
        }
    }

    (ClaimSet::new(accepted), rejected)
}
