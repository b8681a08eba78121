//! Configuration type definitions.
//!
//! Every tunable is optional in the file; accessors fall back to the values
//! in [`super::defaults`]. Keeping the raw `Option`s lets a project config
//! override only what it sets.
//!
//! # Example Configuration
//!
//! ```toml
//! [deletion]
//! timeout_secs = 600
//! poll_interval_secs = 1
//! max_attempts = 3
//! retry_interval_secs = 1
//!
//! [image]
//! delete_timeout_secs = 120
//! delete_poll_interval_secs = 1
//!
//! [workers]
//! default = 20
//!
//! [run]
//! timeout_secs = 3600
//!
//! [kinds."designate.zones"]
//! workers = 1
//! timeout_secs = 30
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScourConfig {
    /// Generic deletion and confirmation settings
    #[serde(default)]
    pub deletion: DeletionConfig,

    /// Image-specific confirmation settings
    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub workers: WorkersConfig,

    /// Whole-run limits
    #[serde(default)]
    pub run: RunConfig,

    /// Per-kind overrides keyed by `service.resource`
    #[serde(default)]
    pub kinds: BTreeMap<String, KindSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionConfig {
    /// Seconds to wait for a deletion to be confirmed.
    /// Default: 600.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Seconds between status checks.
    /// Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Attempts for one delete call when the backend fails transiently.
    /// Default: 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Seconds between delete attempts.
    /// Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval_secs: Option<u64>,
}

impl DeletionConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(defaults::DELETION_TIMEOUT_SECS)
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
            .unwrap_or(defaults::DELETION_POLL_INTERVAL_SECS)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(defaults::DELETE_MAX_ATTEMPTS)
    }

    pub fn retry_interval_secs(&self) -> u64 {
        self.retry_interval_secs
            .unwrap_or(defaults::DELETE_RETRY_INTERVAL_SECS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Default: 120.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_timeout_secs: Option<u64>,

    /// Default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_poll_interval_secs: Option<u64>,
}

impl ImageConfig {
    pub fn delete_timeout_secs(&self) -> u64 {
        self.delete_timeout_secs
            .unwrap_or(defaults::IMAGE_DELETE_TIMEOUT_SECS)
    }

    pub fn delete_poll_interval_secs(&self) -> u64 {
        self.delete_poll_interval_secs
            .unwrap_or(defaults::IMAGE_DELETE_POLL_INTERVAL_SECS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkersConfig {
    /// Worker count for kinds that do not ask for a specific one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<usize>,
}

impl WorkersConfig {
    pub fn default_count(&self) -> usize {
        self.default.unwrap_or(crate::registry::DEFAULT_WORKERS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Cancel the run after this many seconds. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Overrides for one kind, used in `[kinds."<service.resource>"]` sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scour_config_serialization() {
        let mut config = ScourConfig::default();
        config.deletion.timeout_secs = Some(30);
        config.kinds.insert(
            "nova.servers".to_string(),
            KindSettings {
                workers: Some(4),
                ..Default::default()
            },
        );
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ScourConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
        assert!(toml_str.contains("timeout_secs = 30"));
    }

    #[test]
    fn test_accessors_fall_back_to_defaults() {
        let config = ScourConfig::default();
        assert_eq!(config.deletion.timeout_secs(), 600);
        assert_eq!(config.deletion.poll_interval_secs(), 1);
        assert_eq!(config.deletion.max_attempts(), 3);
        assert_eq!(config.deletion.retry_interval_secs(), 1);
        assert_eq!(config.image.delete_timeout_secs(), 120);
        assert_eq!(config.image.delete_poll_interval_secs(), 1);
        assert_eq!(config.workers.default_count(), 20);
    }

    #[test]
    fn test_kind_settings_deserialize() {
        let toml_str = r#"
workers = 1
poll_interval_secs = 2
"#;
        let settings: KindSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.workers, Some(1));
        assert_eq!(settings.timeout_secs, None);
        assert_eq!(settings.poll_interval_secs, Some(2));
    }
}
