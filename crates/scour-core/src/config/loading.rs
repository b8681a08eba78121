//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.scour/config.toml`
//! 3. **Project config** - `./.scour/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{
    DeletionConfig, ImageConfig, KindSettings, RunConfig, ScourConfig, WorkersConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be parsed or the merged result
/// fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<ScourConfig, ConfigError> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".scour").join("config.toml"));
    }
    paths.push(std::env::current_dir()?.join(".scour").join("config.toml"));

    load_from_paths(&paths)
}

/// Merge the config files at `paths` in order over the defaults, then validate.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<ScourConfig, ConfigError> {
    let mut config = ScourConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(layer) => {
                debug!(event = "core.config.file_loaded", path = %path.display());
                config = merge_configs(config, layer);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<ScourConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Optional values are replaced only when the override sets them. Per-kind
/// sections are merged field by field.
pub fn merge_configs(base: ScourConfig, override_config: ScourConfig) -> ScourConfig {
    ScourConfig {
        deletion: DeletionConfig {
            timeout_secs: override_config
                .deletion
                .timeout_secs
                .or(base.deletion.timeout_secs),
            poll_interval_secs: override_config
                .deletion
                .poll_interval_secs
                .or(base.deletion.poll_interval_secs),
            max_attempts: override_config
                .deletion
                .max_attempts
                .or(base.deletion.max_attempts),
            retry_interval_secs: override_config
                .deletion
                .retry_interval_secs
                .or(base.deletion.retry_interval_secs),
        },
        image: ImageConfig {
            delete_timeout_secs: override_config
                .image
                .delete_timeout_secs
                .or(base.image.delete_timeout_secs),
            delete_poll_interval_secs: override_config
                .image
                .delete_poll_interval_secs
                .or(base.image.delete_poll_interval_secs),
        },
        workers: WorkersConfig {
            default: override_config.workers.default.or(base.workers.default),
        },
        run: RunConfig {
            timeout_secs: override_config.run.timeout_secs.or(base.run.timeout_secs),
        },
        kinds: {
            let mut merged = base.kinds;
            for (key, value) in override_config.kinds {
                let existing = merged.remove(&key).unwrap_or_default();
                merged.insert(
                    key,
                    KindSettings {
                        workers: value.workers.or(existing.workers),
                        timeout_secs: value.timeout_secs.or(existing.timeout_secs),
                        poll_interval_secs: value
                            .poll_interval_secs
                            .or(existing.poll_interval_secs),
                    },
                );
            }
            merged
        },
    }
}
