//! Error types for the Analyzer

use prism_runner::InvokeError;
use thiserror::Error;

/// Errors that can occur while analyzing one input
///
/// Extraction itself never fails and export failures are reported on the
/// outcome, so neither has a variant here.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Input rejected before anything was spawned
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The analyzer process failed
    #[error(transparent)]
    Invocation(#[from] InvokeError),
}

impl AnalyzeError {
    /// Whether the failure was a caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalyzeError::Invocation(InvokeError::Cancelled { .. }))
    }
}
