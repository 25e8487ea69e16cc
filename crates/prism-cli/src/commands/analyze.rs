//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use prism_domain::AnalysisKind;
use prism_export::CsvSink;
use prism_extractor::{Analyzer, AnalyzerConfig, TracingSink};
use prism_runner::{cancel_pair, ProcessRunner};
use std::fs;
use std::io::{self, Read};
use tracing::info;

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let input = read_input(&args)?;
    let kind: AnalysisKind = args.kind.into();
    let analyzer_config = effective_config(&config.analyzer, &args);

    let sink = CsvSink::new(&analyzer_config.export_dir);
    let analyzer = Analyzer::new(ProcessRunner::new(), sink, analyzer_config)?;

    // Ctrl-C kills the analyzer process instead of the CLI
    let (handle, token) = cancel_pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling analysis");
            handle.cancel();
        }
    });

    let result = analyzer.analyze(&input, kind, token, &TracingSink).await;
    interrupt.abort();
    let outcome = result?;

    println!("{}", formatter.format_outcome(&outcome)?);

    match &outcome.export {
        Some(Ok(receipt)) => {
            eprintln!("{}", formatter.success(&format!("Saved to {}", receipt.path.display())));
        }
        Some(Err(message)) => {
            eprintln!("{}", formatter.warning(&format!("Result not saved: {}", message)));
        }
        None => {}
    }

    Ok(())
}

/// Pick the input from the positional argument, `--file` or `--stdin`.
fn read_input(args: &AnalyzeArgs) -> Result<String> {
    if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else if let Some(path) = &args.file {
        Ok(fs::read_to_string(path)?)
    } else if let Some(input) = &args.input {
        Ok(input.clone())
    } else {
        Err(CliError::InvalidInput(
            "Provide an input, --file or --stdin".to_string(),
        ))
    }
}

/// Apply command-line overrides on top of the file configuration.
fn effective_config(base: &AnalyzerConfig, args: &AnalyzeArgs) -> AnalyzerConfig {
    let mut config = base.clone();
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(max_input) = args.max_input {
        config.max_input_length = max_input;
    }
    if let Some(executable) = &args.executable {
        config.executable = executable.clone();
    }
    if let Some(export_dir) = &args.export_dir {
        config.export_dir = export_dir.clone();
    }
    if args.no_export {
        config.export_enabled = false;
    }
    config
}
