//! Storage Layer
//!
//! Typed records for sensor readings and detected faults, plus the
//! `Repository` facade over the backing document store. The in-memory
//! implementation backs local operation and tests; a managed store sits
//! behind the same trait in deployment.

mod records;
mod repository;

pub use records::{
    Coordinates, DiagnosticData, FaultRecord, FaultStatus, RootCauseHint, SensorReading,
};
pub use repository::{MemoryRepository, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Record not found")]
    NotFound,
    #[error("Serialization error: {0}")]
    Serialization(String),
}
