//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// `path` is the configuration file in use; `config` is what was loaded
/// from it (or defaults).
pub fn execute_config(args: ConfigArgs, path: &Path, config: &Config, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            init(path, force)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote default configuration to {}", path.display()))
            );
        }
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)
}
