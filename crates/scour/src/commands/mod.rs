use clap::ArgMatches;
use tracing::{error, warn};

use scour_core::ScourConfig;
use scour_core::events;

mod kinds;
mod run;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let command = matches.subcommand_name().unwrap_or("none");
    events::log_app_startup(command);

    let result = match matches.subcommand() {
        Some(("kinds", sub_matches)) => kinds::handle_kinds_command(sub_matches),
        Some(("run", sub_matches)) => run::handle_run_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(command, e.as_ref());
    }
    events::log_app_shutdown(command, result.is_ok());
    result
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> ScourConfig {
    match ScourConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.scour/config.toml and ./.scour/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            ScourConfig::default()
        }
    }
}
