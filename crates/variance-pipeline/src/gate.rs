// Completeness gate applied before any variant is validated
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use shared_types::ClaimSet;

pub const DEFAULT_MIN_CLAIMS: usize = 20;

/// Rejects claim sets too small to be a complete extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessGate {
    pub min_claims: usize,
}

impl CompletenessGate {
    pub fn new(min_claims: usize) -> Self {
        Self { min_claims }
    }

    pub fn check(&self, claims: &ClaimSet) -> Result<(), PipelineError> {
        if claims.len() < self.min_claims {
            return Err(PipelineError::InsufficientClaims {
                found: claims.len(),
                required: self.min_claims,
            });
        }
        Ok(())
    }
}

impl Default for CompletenessGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CLAIMS)
    }
}
