//! Engine error types.
//!
//! Missing data is never an error; it travels through the report as
//! `None` scores and coverage notes. Only the variants below escape
//! the engine.

use thiserror::Error;

/// Errors that stop report generation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An internal invariant does not hold for the given input.
    #[error("Contract violation: {context}")]
    ContractViolation { context: String },

    /// The content pack could not be read at all.
    #[error("Invalid content pack: {0}")]
    InvalidContent(String),
}

impl EngineError {
    pub fn contract(context: impl Into<String>) -> Self {
        Self::ContractViolation {
            context: context.into(),
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
