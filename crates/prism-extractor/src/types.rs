//! Result types for analysis

use chrono::Utc;
use prism_domain::{AnalysisRecord, AnalysisRequest, ExportReceipt};
use prism_runner::{InvocationPlan, RawResponse};
use std::collections::BTreeMap;

/// Field values pulled out of one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// `N/10` scores keyed by field name
    pub scores: BTreeMap<String, Option<u8>>,

    /// Labeled single-line values keyed by field name
    pub labels: BTreeMap<String, Option<String>>,

    /// Bulleted sections keyed by field name
    pub lists: BTreeMap<String, Vec<String>>,
}

impl ExtractedFields {
    /// Number of fields with a value (non-empty for lists)
    pub fn matched(&self) -> usize {
        self.scores.values().filter(|v| v.is_some()).count()
            + self.labels.values().filter(|v| v.is_some()).count()
            + self.lists.values().filter(|v| !v.is_empty()).count()
    }

    /// Number of fields present, matched or not
    pub fn declared(&self) -> usize {
        self.scores.len() + self.labels.len() + self.lists.len()
    }

    /// Stamp the fields into a record, keeping the raw texts alongside
    pub fn into_record(self, request: &AnalysisRequest, response_text: &str) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc::now(),
            content_kind: request.content_kind,
            analysis_kind: request.analysis_kind,
            scores: self.scores,
            labels: self.labels,
            lists: self.lists,
            response_text: response_text.to_string(),
            original_input: request.raw_input.clone(),
        }
    }
}

/// Everything produced by one successful analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The typed record
    pub record: AnalysisRecord,

    /// Raw analyzer output
    pub response: RawResponse,

    /// How the analyzer was invoked
    pub plan: InvocationPlan,

    /// Export result; `None` when export is disabled
    ///
    /// A failed export leaves `record` intact.
    pub export: Option<Result<ExportReceipt, String>>,
}

impl AnalysisOutcome {
    /// Whether the record reached its export file
    pub fn exported(&self) -> bool {
        matches!(self.export, Some(Ok(_)))
    }

    /// Export error message, if export was attempted and failed
    pub fn export_error(&self) -> Option<&str> {
        match &self.export {
            Some(Err(message)) => Some(message),
            _ => None,
        }
    }
}
