//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
///
/// `config_path` is the `--config` override, if one was given.
pub fn run_config(
    action: &ConfigAction,
    settings: Settings,
    config_path: Option<&str>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", render(&settings)?);
        }

        ConfigAction::Path => {
            let path = config_path
                .map(Settings::expand_path)
                .unwrap_or_else(Settings::default_config_path);
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn render(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}
