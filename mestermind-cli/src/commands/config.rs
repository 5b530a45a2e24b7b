//! Configuration management command implementations

use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::{write_default, MestermindConfig};
use crate::error::CliError;

pub fn handle_config_command(
    action: &ConfigCommands,
    config: &MestermindConfig,
    config_path: &Path,
) -> Result<(), CliError> {
    match action {
        ConfigCommands::Show => show_config(config, config_path),
        ConfigCommands::Init { force } => init_config(config_path, *force),
    }
}

fn show_config(config: &MestermindConfig, config_path: &Path) -> Result<(), CliError> {
    let mut shown = config.clone();
    if shown.api.token.is_some() {
        shown.api.token = Some("********".to_string());
    }
    println!("# {}", config_path.display());
    println!("{}", shown.to_toml()?);
    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<(), CliError> {
    if config_path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists; use --force to replace it",
            config_path.display()
        )));
    }
    write_default(config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}
