//! Schemas command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use prism_domain::AnalysisKind;

/// Execute the schemas command.
pub fn execute_schemas(config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_schemas(&patterns(config))?);
    Ok(())
}

/// Every analysis kind with the pattern it will run, overrides applied.
fn patterns(config: &Config) -> Vec<(AnalysisKind, String)> {
    let settings = config.analyzer.runner_settings();
    AnalysisKind::ALL
        .iter()
        .map(|kind| (*kind, settings.pattern_for(*kind).to_string()))
        .collect()
}
