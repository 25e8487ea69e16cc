//! Prism Export Layer
//!
//! Implements the RecordSink trait with append-only CSV files.
//!
//! # Layout
//!
//! - One file per analysis kind: `<export_dir>/<kind>.csv`
//! - Header row written once, when the file is created
//! - Every cell quoted, embedded quotes doubled
//! - List fields joined with `"; "` into one cell
//!
//! # Examples
//!
//! ```no_run
//! use prism_export::{read_rows, CsvSink};
//! use prism_domain::AnalysisKind;
//!
//! let sink = CsvSink::new("/tmp/prism-exports");
//! let rows = read_rows(sink.path_for(AnalysisKind::Rating)).unwrap();
//! println!("{} records", rows.len().saturating_sub(1));
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod row;
pub mod sink;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use codec::{encode_row, escape_cell, parse_csv};
pub use row::{column_count, header_row, record_row, LIST_SEPARATOR};
pub use sink::{append_record, read_rows, CsvSink};

/// Errors that can occur during export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// Destination could not be created, written or read
    #[error("Export I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
