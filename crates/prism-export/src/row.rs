//! Column layout of an export file
//!
//! `timestamp, content_kind, analysis_kind`, then the schema's scored,
//! labeled and list fields in declaration order, then
//! `full_response, original_input`. The layout depends only on the
//! analysis kind, never on which fields a record happened to match.

use chrono::SecondsFormat;
use prism_domain::{AnalysisKind, AnalysisRecord};

/// Separator between list items inside one cell
pub const LIST_SEPARATOR: &str = "; ";

/// Metadata columns before the schema fields
pub const LEADING_COLUMNS: [&str; 3] = ["timestamp", "content_kind", "analysis_kind"];

/// Raw text columns after the schema fields
pub const TRAILING_COLUMNS: [&str; 2] = ["full_response", "original_input"];

/// Number of columns in an export file for `kind`
pub fn column_count(kind: AnalysisKind) -> usize {
    LEADING_COLUMNS.len() + kind.schema().field_count() + TRAILING_COLUMNS.len()
}

/// Header cells for `kind`
pub fn header_row(kind: AnalysisKind) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .copied()
        .chain(kind.schema().field_names())
        .chain(TRAILING_COLUMNS.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Data cells for a record; absent values are empty cells
pub fn record_row(record: &AnalysisRecord) -> Vec<String> {
    let schema = record.analysis_kind.schema();
    let mut cells = Vec::with_capacity(column_count(record.analysis_kind));

    cells.push(record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
    cells.push(record.content_kind.as_str().to_string());
    cells.push(record.analysis_kind.as_str().to_string());

    for field in schema.scored {
        cells.push(record.score(field).map(|s| s.to_string()).unwrap_or_default());
    }
    for field in schema.labeled {
        cells.push(record.label(field).unwrap_or_default().to_string());
    }
    for field in schema.lists {
        cells.push(record.list(field).join(LIST_SEPARATOR));
    }

    cells.push(record.response_text.clone());
    cells.push(record.original_input.clone());
    cells
}
