//! # Configuration System
//!
//! Hierarchical TOML configuration for scour.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.scour/config.toml`
//! 3. **Project config** - `./.scour/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.scour/config.toml
//! [deletion]
//! timeout_secs = 300
//! poll_interval_secs = 2
//!
//! [image]
//! delete_timeout_secs = 60
//!
//! [kinds."nova.servers"]
//! workers = 5
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use scour_core::config::ScourConfig;
//!
//! fn example() -> Result<(), scour_core::errors::ConfigError> {
//!     let config = ScourConfig::load_hierarchy()?;
//!     let settings = config.default_poll_settings();
//!     println!("confirming deletions for up to {:?}", settings.timeout);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{DeletionConfig, ImageConfig, KindSettings, RunConfig, ScourConfig, WorkersConfig};
pub use validation::validate_config;

use std::time::Duration;

use crate::errors::ConfigError;
use crate::poller::PollSettings;
use crate::registry::{DEFAULT_WORKERS, ResourceKind};

/// Kind whose confirmation uses the `[image]` settings.
pub const IMAGE_KIND_KEY: &str = "glance.images";

impl ScourConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    /// Generic confirmation timeout and poll interval.
    pub fn default_poll_settings(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_secs(self.deletion.timeout_secs()),
            Duration::from_secs(self.deletion.poll_interval_secs()),
        )
    }

    /// Confirmation settings used while deleting images.
    pub fn image_poll_settings(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_secs(self.image.delete_timeout_secs()),
            Duration::from_secs(self.image.delete_poll_interval_secs()),
        )
    }

    /// Confirmation settings for one kind.
    ///
    /// Resolution order:
    /// 1. `[kinds."<service.resource>"]` override, field by field
    /// 2. `[image]` settings for the image kind
    /// 3. `[deletion]` defaults
    pub fn poll_settings_for(&self, kind: &ResourceKind) -> PollSettings {
        let key = kind.key();
        let base = if key == IMAGE_KIND_KEY {
            self.image_poll_settings()
        } else {
            self.default_poll_settings()
        };

        match self.kinds.get(&key) {
            Some(settings) => PollSettings::new(
                settings
                    .timeout_secs
                    .map_or(base.timeout, Duration::from_secs),
                settings
                    .poll_interval_secs
                    .map_or(base.interval, Duration::from_secs),
            ),
            None => base,
        }
    }

    /// Worker count for one kind.
    ///
    /// Resolution order:
    /// 1. `[kinds."<service.resource>"].workers`
    /// 2. The count the kind was registered with, when it asked for one
    /// 3. `[workers].default`
    pub fn workers_for(&self, kind: &ResourceKind) -> usize {
        if let Some(workers) = self.kinds.get(&kind.key()).and_then(|s| s.workers) {
            return workers;
        }
        if kind.workers != DEFAULT_WORKERS {
            return kind.workers;
        }
        self.workers.default_count()
    }

    /// Attempts allowed for one delete call and the pause between them.
    pub fn delete_retry(&self) -> (u32, Duration) {
        (
            self.deletion.max_attempts(),
            Duration::from_secs(self.deletion.retry_interval_secs()),
        )
    }

    /// Overall run budget, if one is configured.
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run.timeout_secs.map(Duration::from_secs)
    }
}
