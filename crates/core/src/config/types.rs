use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub media_host: MediaHostConfig,
    pub image_generation: ImageGenerationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for every path no API route matches.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Document (relative to `static_dir`) returned when no file matches.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Body size limit for the PDF upload route.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            index_file: default_index_file(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared admin secret, expected as `Authorization: Bearer <admin_token>`.
    pub admin_token: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("pdfshelf.db")
}

/// Cloudinary media host configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaHostConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Cloudinary API URL (e.g., "https://api.cloudinary.com")
    #[serde(default = "default_media_api_base")]
    pub api_base: String,
    /// Folder that generated cover images are uploaded into.
    #[serde(default = "default_cover_folder")]
    pub cover_folder: String,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_media_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_cover_folder() -> String {
    "pdf_covers".to_string()
}

/// Gemini image generation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageGenerationConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_generation_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// MIME type requested through `generationConfig.responseMimeType`.
    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: String,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_generation_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_response_mime_type() -> String {
    "image/png".to_string()
}

fn default_timeout() -> u32 {
    120
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media_host: SanitizedMediaHostConfig,
    pub image_generation: SanitizedImageGenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub admin_token_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMediaHostConfig {
    pub cloud_name: String,
    pub api_base: String,
    pub cover_folder: String,
    pub credentials_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedImageGenerationConfig {
    pub model: String,
    pub api_base: String,
    pub api_version: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                admin_token_configured: !config.auth.admin_token.is_empty(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            media_host: SanitizedMediaHostConfig {
                cloud_name: config.media_host.cloud_name.clone(),
                api_base: config.media_host.api_base.clone(),
                cover_folder: config.media_host.cover_folder.clone(),
                credentials_configured: !config.media_host.api_key.is_empty()
                    && !config.media_host.api_secret.is_empty(),
                timeout_secs: config.media_host.timeout_secs,
            },
            image_generation: SanitizedImageGenerationConfig {
                model: config.image_generation.model.clone(),
                api_base: config.image_generation.api_base.clone(),
                api_version: config.image_generation.api_version.clone(),
                api_key_configured: !config.image_generation.api_key.is_empty(),
                timeout_secs: config.image_generation.timeout_secs,
            },
        }
    }
}
