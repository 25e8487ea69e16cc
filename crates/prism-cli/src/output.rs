//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use prism_domain::{video_id, AnalysisKind, AnalysisRecord, ContentKind};
use prism_extractor::AnalysisOutcome;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest cell shown in history tables before eliding
const HISTORY_CELL_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of an analysis.
    pub fn format_outcome(&self, outcome: &AnalysisOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(outcome),
            OutputFormat::Table => Ok(self.format_record_table(&outcome.record)),
            OutputFormat::Quiet => Ok(outcome.record.response_text.trim_end().to_string()),
        }
    }

    fn format_outcome_json(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let export = match &outcome.export {
            None => serde_json::Value::Null,
            Some(Ok(receipt)) => serde_json::json!({
                "path": receipt.path.display().to_string(),
                "bytes_written": receipt.bytes_written,
                "header_written": receipt.header_written,
            }),
            Some(Err(message)) => serde_json::json!({ "error": message }),
        };

        let value = serde_json::json!({
            "record": outcome.record,
            "duration_ms": outcome.response.duration_ms,
            "export": export,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Format a record as a field/value table.
    fn format_record_table(&self, record: &AnalysisRecord) -> String {
        let schema = record.analysis_kind.schema();
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);

        for field in schema.scored {
            let value = match record.score(field) {
                Some(score) => format!("{}/10", score),
                None => "-".to_string(),
            };
            builder.push_record([field.to_string(), value]);
        }
        for field in schema.labeled {
            builder.push_record([field.to_string(), record.label(field).unwrap_or("-").to_string()]);
        }
        for field in schema.lists {
            let items = record.list(field);
            let value = if items.is_empty() {
                "-".to_string()
            } else {
                items
                    .iter()
                    .map(|item| format!("• {}", item))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            builder.push_record([field.to_string(), value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let summary = format!(
            "{} analysis of {} input: {}/{} fields matched",
            record.analysis_kind,
            record.content_kind,
            record.matched_fields(),
            record.declared_fields()
        );
        format!("{}\n{}", self.info(&summary), table)
    }

    /// Format a classification result.
    pub fn format_classification(&self, input: &str, kind: ContentKind) -> Result<String> {
        let id = video_id(input);
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "content_kind": kind,
                "video_id": id,
            }))?),
            OutputFormat::Quiet => Ok(kind.to_string()),
            OutputFormat::Table => {
                let mut line = format!("Content kind: {}", self.colorize(kind.as_str(), "cyan"));
                if let Some(id) = id {
                    line.push_str(&format!("\nVideo id: {}", id));
                }
                Ok(line)
            }
        }
    }

    /// Format the list of analysis kinds and their fields.
    pub fn format_schemas(&self, patterns: &[(AnalysisKind, String)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let kinds: Vec<serde_json::Value> = patterns
                    .iter()
                    .map(|(kind, pattern)| {
                        let schema = kind.schema();
                        serde_json::json!({
                            "kind": kind,
                            "pattern": pattern,
                            "scored": schema.scored,
                            "labeled": schema.labeled,
                            "lists": schema.lists,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&kinds)?)
            }
            OutputFormat::Quiet => Ok(patterns
                .iter()
                .map(|(kind, _)| kind.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Kind", "Pattern", "Scored", "Labeled", "Lists"]);
                for (kind, pattern) in patterns {
                    let schema = kind.schema();
                    builder.push_record([
                        kind.to_string(),
                        pattern.clone(),
                        schema.scored.join(", "),
                        schema.labeled.join(", "),
                        schema.lists.join(", "),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format exported rows (header first).
    pub fn format_history(&self, header: &[String], rows: &[Vec<String>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
                    .iter()
                    .map(|row| {
                        header
                            .iter()
                            .zip(row)
                            .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                            .collect()
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&records)?)
            }
            OutputFormat::Quiet => Ok(rows
                .iter()
                .filter_map(|row| row.first().cloned())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No records found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(header.iter().map(|h| h.as_str()));
                for row in rows {
                    builder.push_record(row.iter().map(|cell| elide(cell, HISTORY_CELL_CHARS)));
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Shorten a cell to one line of at most `max` characters.
fn elide(cell: &str, max: usize) -> String {
    let flat = cell.replace(['\r', '\n'], " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let kept: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnalysisRecord {
        let json = serde_json::json!({
            "timestamp": "2024-05-01T12:00:00Z",
            "content_kind": "text",
            "analysis_kind": "swot",
            "scores": { "Overall": 7 },
            "labels": { "Summary": "Solid", "Strategic Recommendation": null },
            "lists": {
                "Strengths": ["Brand", "Reach"],
                "Weaknesses": [],
                "Opportunities": [],
                "Threats": []
            },
            "response_text": "Overall: 7/10\n",
            "original_input": "input"
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_record_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_record_table(&record());
        assert!(output.contains("7/10"));
        assert!(output.contains("• Brand"));
        assert!(output.contains("Strategic Recommendation"));
        assert!(output.contains("3/7 fields matched"));
    }

    #[test]
    fn test_classification_formats() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        let table = Formatter::new(OutputFormat::Table, false);
        let output = table.format_classification(url, ContentKind::VideoUrl).unwrap();
        assert!(output.contains("video_url"));
        assert!(output.contains("dQw4w9WgXcQ"));

        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(
            quiet.format_classification("hello", ContentKind::Text).unwrap(),
            "text"
        );
    }

    #[test]
    fn test_schemas_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let patterns = vec![(AnalysisKind::Wisdom, "extract_wisdom".to_string())];
        let output = formatter.format_schemas(&patterns).unwrap();
        assert!(output.contains("\"kind\": \"wisdom\""));
        assert!(output.contains("One-Sentence Takeaway"));
    }

    #[test]
    fn test_history_table_elides_long_cells() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let header = vec!["timestamp".to_string(), "full_response".to_string()];
        let rows = vec![vec!["t".to_string(), "x\n".repeat(100)]];
        let output = formatter.format_history(&header, &rows).unwrap();
        assert!(output.contains('…'));
    }

    #[test]
    fn test_empty_history() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_history(&[], &[]).unwrap();
        assert!(output.contains("No records found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
