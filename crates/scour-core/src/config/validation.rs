use crate::config::types::ScourConfig;
use crate::errors::ConfigError;

fn invalid(message: String) -> ConfigError {
    ConfigError::InvalidConfiguration { message }
}

fn check_poll_pair(scope: &str, timeout_secs: u64, interval_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 {
        return Err(invalid(format!("{scope} timeout must be greater than zero")));
    }
    if interval_secs == 0 {
        return Err(invalid(format!(
            "{scope} poll interval must be greater than zero"
        )));
    }
    if interval_secs > timeout_secs {
        return Err(invalid(format!(
            "{scope} poll interval ({interval_secs}s) exceeds its timeout ({timeout_secs}s)"
        )));
    }
    Ok(())
}

/// Validate a merged configuration.
///
/// Durations must be non-zero, poll intervals must not exceed their timeout,
/// and worker counts must be at least one.
pub fn validate_config(config: &ScourConfig) -> Result<(), ConfigError> {
    check_poll_pair(
        "deletion",
        config.deletion.timeout_secs(),
        config.deletion.poll_interval_secs(),
    )?;
    check_poll_pair(
        "image",
        config.image.delete_timeout_secs(),
        config.image.delete_poll_interval_secs(),
    )?;

    if config.deletion.max_attempts() == 0 {
        return Err(invalid(
            "deletion.max_attempts must be at least 1".to_string(),
        ));
    }
    if config.workers.default_count() == 0 {
        return Err(invalid("workers.default must be at least 1".to_string()));
    }
    if config.run.timeout_secs == Some(0) {
        return Err(invalid(
            "run.timeout_secs must be greater than zero".to_string(),
        ));
    }

    for (key, settings) in &config.kinds {
        let well_formed = key
            .split_once('.')
            .is_some_and(|(service, resource)| !service.is_empty() && !resource.is_empty());
        if !well_formed {
            return Err(invalid(format!(
                "kind override '{key}' must be named 'service.resource'"
            )));
        }
        if settings.workers == Some(0) {
            return Err(invalid(format!("kinds.{key}.workers must be at least 1")));
        }
        check_poll_pair(
            &format!("kinds.{key}"),
            settings
                .timeout_secs
                .unwrap_or(config.deletion.timeout_secs()),
            settings
                .poll_interval_secs
                .unwrap_or(config.deletion.poll_interval_secs()),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ScourConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ScourConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = validate_config(&parse("[deletion]\ntimeout_secs = 0\n")).unwrap_err();
        assert!(err.to_string().contains("deletion timeout"));
    }

    #[test]
    fn test_interval_above_timeout_rejected() {
        let err = validate_config(&parse(
            "[image]\ndelete_timeout_secs = 5\ndelete_poll_interval_secs = 10\n",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("exceeds its timeout"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(validate_config(&parse("[workers]\ndefault = 0\n")).is_err());
        assert!(validate_config(&parse("[kinds.\"nova.servers\"]\nworkers = 0\n")).is_err());
    }

    #[test]
    fn test_malformed_kind_key_rejected() {
        let err = validate_config(&parse("[kinds.servers]\nworkers = 2\n")).unwrap_err();
        assert!(err.to_string().contains("service.resource"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(validate_config(&parse("[deletion]\nmax_attempts = 0\n")).is_err());
    }
}
