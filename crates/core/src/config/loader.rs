use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for structured overrides, e.g. `PDFSHELF_AUTH__ADMIN_TOKEN`.
pub const ENV_PREFIX: &str = "PDFSHELF_";

/// Plain environment variable names mapped onto their config keys.
const CONVENTIONAL_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("ADMIN_SECRET_TOKEN", "auth.admin_token"),
    ("CLOUDINARY_CLOUD_NAME", "media_host.cloud_name"),
    ("CLOUDINARY_API_KEY", "media_host.api_key"),
    ("CLOUDINARY_API_SECRET", "media_host.api_secret"),
    ("GEMINI_API_KEY", "image_generation.api_key"),
];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(base: Figment) -> Result<Config, ConfigError> {
    base.merge(conventional_env())
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn conventional_env() -> Env {
    let names: Vec<&str> = CONVENTIONAL_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        CONVENTIONAL_ENV_KEYS
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
            .unwrap_or_else(|| key.as_str().into())
    })
}
