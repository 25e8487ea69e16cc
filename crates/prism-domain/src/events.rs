//! Pipeline events - the side channel describing what the pipeline did
//!
//! Events are handed to an [`EventSink`] passed into the pipeline. Sinks
//! decide whether to keep, forward or drop them; the pipeline itself holds
//! no log state.

use crate::content::ContentKind;
use crate::schema::AnalysisKind;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Why a process was terminated before it exited on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillReason {
    /// The timeout elapsed
    Timeout,
    /// The caller cancelled the invocation
    Cancelled,
}

impl KillReason {
    /// Get the reason as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            KillReason::Timeout => "timeout",
            KillReason::Cancelled => "cancelled",
        }
    }
}

/// A significant pipeline occurrence
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Input was classified
    Classified {
        /// Assigned kind
        kind: ContentKind,
        /// Input length in characters
        input_chars: usize,
    },

    /// Payload was cut to the length limit
    Truncated {
        /// Length before truncation (characters)
        original_chars: usize,
        /// Characters kept
        kept_chars: usize,
    },

    /// Analyzer process was started
    Spawned {
        /// Executable
        program: String,
        /// Argument list
        args: Vec<String>,
        /// Whether the payload goes through stdin
        via_stdin: bool,
    },

    /// Analyzer process exited on its own
    Exited {
        /// Exit code (`None` when terminated by a signal)
        exit_code: Option<i32>,
        /// Wall time since spawn
        duration_ms: u64,
        /// Captured stdout size in bytes
        stdout_bytes: usize,
        /// Captured stderr size in bytes
        stderr_bytes: usize,
    },

    /// Analyzer process was terminated
    Killed {
        /// Why
        reason: KillReason,
        /// Wall time since spawn
        after_ms: u64,
    },

    /// Response was parsed against a schema
    Extracted {
        /// Schema used
        analysis_kind: AnalysisKind,
        /// Fields that matched
        matched: usize,
        /// Fields declared by the schema
        declared: usize,
    },

    /// Record was appended to an export file
    Exported {
        /// Destination file
        path: PathBuf,
        /// Bytes appended
        bytes: usize,
        /// Whether the header row was written too
        header_written: bool,
    },

    /// Record could not be exported
    ExportFailed {
        /// Destination file
        path: PathBuf,
        /// Error description
        message: String,
    },
}

impl PipelineEvent {
    /// Short stage tag used in log lines
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineEvent::Classified { .. } => "classify",
            PipelineEvent::Truncated { .. } => "truncate",
            PipelineEvent::Spawned { .. } => "spawn",
            PipelineEvent::Exited { .. } => "exit",
            PipelineEvent::Killed { .. } => "kill",
            PipelineEvent::Extracted { .. } => "extract",
            PipelineEvent::Exported { .. } => "export",
            PipelineEvent::ExportFailed { .. } => "export",
        }
    }

    /// Whether the event reports a problem or data loss
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            PipelineEvent::Truncated { .. }
                | PipelineEvent::Killed { .. }
                | PipelineEvent::ExportFailed { .. }
        )
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Classified { kind, input_chars } => {
                write!(f, "input classified as {} ({} chars)", kind, input_chars)
            }
            PipelineEvent::Truncated { original_chars, kept_chars } => write!(
                f,
                "payload truncated from {} to {} chars",
                original_chars, kept_chars
            ),
            PipelineEvent::Spawned { program, args, via_stdin } => write!(
                f,
                "spawned {} {} (input via {})",
                program,
                args.join(" "),
                if *via_stdin { "stdin" } else { "argument" }
            ),
            PipelineEvent::Exited { exit_code, duration_ms, stdout_bytes, stderr_bytes } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(
                    f,
                    "process exited with {} after {} ms (stdout {} bytes, stderr {} bytes)",
                    code, duration_ms, stdout_bytes, stderr_bytes
                )
            }
            PipelineEvent::Killed { reason, after_ms } => {
                write!(f, "process killed ({}) after {} ms", reason.as_str(), after_ms)
            }
            PipelineEvent::Extracted { analysis_kind, matched, declared } => write!(
                f,
                "{} schema matched {}/{} fields",
                analysis_kind, matched, declared
            ),
            PipelineEvent::Exported { path, bytes, header_written } => write!(
                f,
                "appended {} bytes to {}{}",
                bytes,
                path.display(),
                if *header_written { " (new file, header written)" } else { "" }
            ),
            PipelineEvent::ExportFailed { path, message } => {
                write!(f, "export to {} failed: {}", path.display(), message)
            }
        }
    }
}

/// A timestamped pipeline event
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// When the event was recorded
    pub at: DateTime<Utc>,
    /// What happened
    pub event: PipelineEvent,
}

impl LogEvent {
    /// Stamp an event with the current time
    pub fn now(event: PipelineEvent) -> Self {
        Self { at: Utc::now(), event }
    }
}

impl fmt::Display for LogEvent {
    /// `2026-01-01T12:00:00.000Z [spawn] spawned fabric --pattern x (input via stdin)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.event.stage(),
            self.event
        )
    }
}

/// Receiver of pipeline events
///
/// Implementations must be cheap and must not fail; a sink that cannot
/// persist an event drops it.
pub trait EventSink: Send + Sync {
    /// Record one event
    fn record(&self, event: PipelineEvent);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn record(&self, event: PipelineEvent) {
        (**self).record(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn record(&self, event: PipelineEvent) {
        (**self).record(event)
    }
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: PipelineEvent) {}
}

/// Sink that keeps every event in memory
///
/// Clones share the same buffer.
///
/// # Examples
///
/// ```
/// use prism_domain::events::{EventSink, MemorySink, PipelineEvent};
/// use prism_domain::ContentKind;
///
/// let sink = MemorySink::new();
/// sink.record(PipelineEvent::Classified { kind: ContentKind::Text, input_chars: 5 });
/// assert_eq!(sink.events().len(), 1);
/// assert!(sink.lines()[0].contains("[classify]"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recorded events rendered as log lines
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }

    /// Whether any recorded event has the given stage tag
    pub fn has_stage(&self, stage: &str) -> bool {
        self.events().iter().any(|e| e.event.stage() == stage)
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogEvent::now(event));
    }
}
