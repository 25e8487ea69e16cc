//! Prism CLI - Command-line interface for the Prism analysis pipeline.

use clap::Parser;
use prism_cli::commands;
use prism_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(verbose)
        .init();
}

async fn run(cli: Cli) -> prism_cli::Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = match (&cli.command, Config::load_from(&config_path)) {
        (_, Ok(config)) => config,
        // Keep `config init --force` usable when the file is broken
        (Command::Config(_), Err(e)) => {
            tracing::warn!("Ignoring unreadable config: {}", e);
            Config::default()
        }
        (_, Err(e)) => return Err(e),
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await,
        Command::Classify(args) => commands::execute_classify(args, &formatter),
        Command::Schemas => commands::execute_schemas(&config, &formatter),
        Command::History(args) => commands::execute_history(args, &config, &formatter),
        Command::Config(args) => commands::execute_config(args, &config_path, &config, &formatter),
    }
}
