//! Fault Detection Engine
//!
//! Takes one sensor reading at a time, evaluates the active rules, and
//! drives the fault lifecycle: create-or-suppress on trigger, acknowledge,
//! resolve. Fault creation is a two-phase contract: persist must succeed
//! or the whole operation fails; notification afterwards is best-effort.

mod diagnostics;
mod engine;

pub use diagnostics::build_diagnostics;
pub use engine::{DetectionConfig, DetectionEngine};

use storage::StorageError;
use thiserror::Error;

/// Detection errors surfaced to callers
#[derive(Debug, Error)]
pub enum DetectionError {
    /// No fault exists with the given id
    #[error("Fault not found: {0}")]
    NotFound(String),

    /// Fault document could not be written; the triggering reading is
    /// considered unprocessed and may be retried by the caller
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),
}
