//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis error
    #[error(transparent)]
    Analyze(#[from] prism_extractor::AnalyzeError),

    /// Export file error
    #[error(transparent)]
    Export(#[from] prism_export::ExportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit code for this error
    ///
    /// 130 for a cancelled analysis (as after Ctrl-C), 2 for usage and
    /// configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Analyze(e) if e.is_cancelled() => 130,
            CliError::Config(_) | CliError::Toml(_) | CliError::InvalidInput(_) => 2,
            CliError::Analyze(prism_extractor::AnalyzeError::Config(_)) => 2,
            _ => 1,
        }
    }
}
