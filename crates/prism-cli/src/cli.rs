//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use prism_domain::AnalysisKind;
use std::path::PathBuf;

/// Prism CLI - Analyze text and links with an external analyzer.
#[derive(Debug, Parser)]
#[command(name = "prism")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PRISM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (raw values only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an analysis and export the result
    Analyze(AnalyzeArgs),

    /// Show how an input would be classified
    Classify(ClassifyArgs),

    /// List analysis kinds and the fields they extract
    Schemas,

    /// Show recently exported records
    History(HistoryArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Text or URL to analyze
    pub input: Option<String>,

    /// Read the input from a file
    #[arg(long, conflicts_with_all = ["input", "stdin"])]
    pub file: Option<PathBuf>,

    /// Read the input from stdin
    #[arg(long, conflicts_with = "input")]
    pub stdin: bool,

    /// Analysis to run
    #[arg(short, long, value_enum, default_value = "rating")]
    pub kind: KindArg,

    /// Do not append the result to the export file
    #[arg(long)]
    pub no_export: bool,

    /// Timeout in seconds
    #[arg(short, long, env = "PRISM_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum input length in characters
    #[arg(long)]
    pub max_input: Option<usize>,

    /// Analyzer executable
    #[arg(long, env = "PRISM_EXECUTABLE")]
    pub executable: Option<String>,

    /// Directory for export files
    #[arg(long, env = "PRISM_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Text or URL to classify
    pub input: String,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Analysis kind whose export file is read
    #[arg(short, long, value_enum, default_value = "rating")]
    pub kind: KindArg,

    /// Maximum number of records (most recent last)
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

/// Analysis kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// Numeric ratings
    Rating,
    /// SWOT analysis
    Swot,
    /// StoryBrand narrative
    #[value(alias = "sb7")]
    Storybrand,
    /// Ideas, insights and quotes
    Wisdom,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<KindArg> for AnalysisKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Rating => AnalysisKind::Rating,
            KindArg::Swot => AnalysisKind::Swot,
            KindArg::Storybrand => AnalysisKind::StoryBrand,
            KindArg::Wisdom => AnalysisKind::Wisdom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from(["prism", "analyze", "some text", "--kind", "sb7", "--no-export"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.input.as_deref(), Some("some text"));
                assert_eq!(args.kind, KindArg::Storybrand);
                assert!(args.no_export);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_file_conflicts_with_positional_input() {
        let result = Cli::try_parse_from(["prism", "analyze", "text", "--file", "a.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["prism", "schemas", "--format", "json", "--no-color"]);
        assert!(matches!(cli.command, Command::Schemas));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
    }

    #[test]
    fn test_kind_conversion() {
        let kind: AnalysisKind = KindArg::Storybrand.into();
        assert_eq!(kind, AnalysisKind::StoryBrand);
    }
}
