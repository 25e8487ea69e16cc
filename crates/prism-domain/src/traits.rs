//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and durable
//! storage. Implementations live in other crates.

use crate::AnalysisRecord;
use std::path::PathBuf;

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    /// File the record was appended to
    pub path: PathBuf,

    /// Bytes appended, header included
    pub bytes_written: usize,

    /// Whether this append created the header row
    pub header_written: bool,
}

/// Trait for durably persisting analysis records
///
/// Implemented by the infrastructure layer (prism-export)
pub trait RecordSink: Send + Sync {
    /// Error type for export operations
    type Error;

    /// Append a record to the destination chosen for its analysis kind
    fn export(&self, record: &AnalysisRecord) -> Result<ExportReceipt, Self::Error>;

    /// Where a record of this kind would be written
    fn destination(&self, record: &AnalysisRecord) -> PathBuf;
}
