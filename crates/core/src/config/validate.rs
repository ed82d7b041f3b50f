use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0 and upload limit is positive
/// - Admin token and external service credentials are non-empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    require_non_empty("auth.admin_token", &config.auth.admin_token)?;
    require_non_empty("media_host.cloud_name", &config.media_host.cloud_name)?;
    require_non_empty("media_host.api_key", &config.media_host.api_key)?;
    require_non_empty("media_host.api_secret", &config.media_host.api_secret)?;
    require_non_empty("image_generation.api_key", &config.image_generation.api_key)?;

    Ok(())
}

fn require_non_empty(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} must not be empty",
            key
        )));
    }
    Ok(())
}
