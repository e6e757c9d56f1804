use shared_types::VariantKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Expected at least {required} claims, got {found}")]
    InsufficientClaims { found: usize, required: usize },

    #[error("Variant {0} was supplied more than once")]
    DuplicateVariant(VariantKind),

    #[error("Variant {0} is not enabled in the pipeline configuration")]
    VariantNotEnabled(VariantKind),
}
