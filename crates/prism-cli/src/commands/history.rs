//! History command implementation.

use crate::cli::HistoryArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use prism_domain::AnalysisKind;
use prism_export::{read_rows, CsvSink};
use std::path::Path;

/// Execute the history command.
pub fn execute_history(args: HistoryArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let kind: AnalysisKind = args.kind.into();
    let path = CsvSink::new(&config.analyzer.export_dir).path_for(kind);

    if !path.exists() {
        println!(
            "{}",
            formatter.info(&format!("No {} exports yet ({})", kind, path.display()))
        );
        return Ok(());
    }

    let (header, rows) = recent_rows(&path, args.limit)?;
    println!("{}", formatter.format_history(&header, &rows)?);
    Ok(())
}

/// Header and the last `limit` data rows of an export file.
fn recent_rows(path: &Path, limit: usize) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rows = read_rows(path)?.into_iter();
    let header = rows.next().unwrap_or_default();
    let data: Vec<Vec<String>> = rows.collect();
    let skip = data.len().saturating_sub(limit);
    Ok((header, data.into_iter().skip(skip).collect()))
}
