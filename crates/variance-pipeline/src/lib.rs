//! Batch pipeline around the compliance engine
//!
//! Applies the completeness gate to an extracted claim set, validates each
//! rendered variant in parallel, and persists the results for review.

pub mod config;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod persist;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use gate::CompletenessGate;
pub use orchestrator::{BatchOutcome, Generation, Orchestrator, VariantOutcome, VariantStatus};
pub use persist::persist_batch;
