//! Prism Extractor
//!
//! Turns analyzer output into typed records and runs the full analysis
//! pipeline.
//!
//! # Architecture
//!
//! ```text
//! Input → classify → InvocationPlan → Invoker → extract → RecordSink
//! ```
//!
//! # Extraction rules
//!
//! - **Scores**: the first `N/10` on the same line as the keyword
//!   (case-insensitive); values above 10 are absent
//! - **Labels**: the rest of the first line starting with `Label:`
//! - **Lists**: bullet lines (`-`, `*`, `•`) after a heading line, up to a
//!   blank line or the next heading
//!
//! A field that does not match is absent. Extraction never fails.
//!
//! # Example Usage
//!
//! ```no_run
//! use prism_domain::{AnalysisKind, AnalysisRecord, ExportReceipt, RecordSink};
//! use prism_extractor::{Analyzer, AnalyzerConfig, TracingSink};
//! use prism_runner::{CancelToken, MockRunner};
//! use std::path::PathBuf;
//!
//! struct Discard;
//!
//! impl RecordSink for Discard {
//!     type Error = std::io::Error;
//!     fn export(&self, record: &AnalysisRecord) -> Result<ExportReceipt, Self::Error> {
//!         Ok(ExportReceipt { path: self.destination(record), bytes_written: 0, header_written: false })
//!     }
//!     fn destination(&self, _record: &AnalysisRecord) -> PathBuf {
//!         PathBuf::from("/dev/null")
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = MockRunner::new("Clarity: 8/10\nVerdict: Worth reading");
//! let analyzer = Analyzer::new(runner, Discard, AnalyzerConfig::default())?;
//!
//! let outcome = analyzer
//!     .analyze("Some article text", AnalysisKind::Rating, CancelToken::never(), &TracingSink)
//!     .await?;
//!
//! println!("Clarity: {:?}", outcome.record.score("Clarity"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod parser;
mod sink;
mod types;


pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::AnalyzeError;
pub use parser::{extract, extract_fields, find_label, find_list, find_score, MAX_SCORE};
pub use sink::{TeeSink, TracingSink};
pub use types::{AnalysisOutcome, ExtractedFields};
