//! Prism Domain Layer
//!
//! Value types, static schemas and trait interfaces shared by every other
//! prism crate. Nothing here performs I/O.
//!
//! ## Key Concepts
//!
//! - **ContentKind**: plain text, generic URL, or video-platform URL
//! - **AnalysisKind**: which analysis is run and which schema parses it
//! - **ExtractionSchema**: the scored, labeled and list fields of a response
//! - **AnalysisRecord**: the typed result, with absent fields kept as `None`
//! - **PipelineEvent**: what happened, reported through an `EventSink`
//!
//! ## Pipeline
//!
//! ```text
//! raw input → classify → invoke analyzer → extract → export
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod events;
pub mod record;
pub mod request;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use content::{classify, is_absolute_url, video_id, ContentKind};
pub use events::{EventSink, KillReason, LogEvent, MemorySink, NullSink, PipelineEvent};
pub use record::AnalysisRecord;
pub use request::AnalysisRequest;
pub use schema::{AnalysisKind, ExtractionSchema};
pub use traits::{ExportReceipt, RecordSink};
