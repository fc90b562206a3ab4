use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Required secrets and host are not blank
/// - DSM port is not 0
/// - Timeouts are positive
/// - Destination roots are absolute
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "telegram.bot_token cannot be empty".to_string(),
        ));
    }

    if config.dsm.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "dsm.host cannot be empty".to_string(),
        ));
    }
    if config.dsm.account.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "dsm.account cannot be empty".to_string(),
        ));
    }
    if config.dsm.port == 0 {
        return Err(ConfigError::ValidationError(
            "dsm.port cannot be 0".to_string(),
        ));
    }
    if config.dsm.timeout_secs == 0 || config.dsm.listing_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "dsm timeouts must be greater than 0".to_string(),
        ));
    }
    if config.metadata.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "metadata.timeout_secs must be greater than 0".to_string(),
        ));
    }

    for (key, value) in [
        ("destination.folder_parent", &config.destination.folder_parent),
        ("destination.download_root", &config.destination.download_root),
    ] {
        if !value.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an absolute path, got '{}'",
                key, value
            )));
        }
    }

    Ok(())
}
