pub mod auth;
pub mod catalog;
pub mod config;
pub mod imagegen;
pub mod media;
pub mod metrics;
pub mod testing;

pub use auth::{
    create_authenticator, AdminTokenAuthenticator, AuthError, AuthRequest, Authenticator,
    Identity,
};
pub use catalog::{CatalogError, NewPdfEntry, PdfCatalog, PdfEntry, SqlitePdfCatalog};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use imagegen::{GeminiImageGenerator, GeneratedImage, GenerationError, ImageGenerator};
pub use media::{
    ByteStream, CloudinaryHost, MediaError, MediaHost, ResourceType, UploadRequest, UploadSource,
    UploadedAsset,
};
