//! Testing utilities and mock implementations for E2E tests.
//!
//! Mocks stand in for the catalogue store, the media host and the image
//! generator so the HTTP surface can be exercised without real services.
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfshelf_core::testing::{MockImageGenerator, MockMediaHost, MockPdfCatalog};
//!
//! let catalog = MockPdfCatalog::new();
//! let media_host = MockMediaHost::new();
//! let generator = MockImageGenerator::new();
//!
//! generator.set_next_error(GenerationError::MissingImageData("no candidates".into())).await;
//!
//! // Use in AppState...
//! ```

mod mock_catalog;
mod mock_image_generator;
mod mock_media_host;

pub use mock_catalog::{MockPdfCatalog, RecordedCatalogCall};
pub use mock_image_generator::MockImageGenerator;
pub use mock_media_host::{MockMediaHost, RecordedPayload, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::NewPdfEntry;
    use crate::config::{
        AuthConfig, Config, DatabaseConfig, ImageGenerationConfig, MediaHostConfig, ServerConfig,
    };
    use crate::imagegen::GeneratedImage;

    /// Admin token used by [`test_config`].
    pub const ADMIN_TOKEN: &str = "test-admin-token";

    /// Base64 of a 1x1 transparent PNG.
    pub const PNG_1X1_BASE64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    pub fn png_image() -> GeneratedImage {
        GeneratedImage::new("image/png", PNG_1X1_BASE64)
    }

    /// A complete entry with every link set.
    pub fn full_entry(title: &str) -> NewPdfEntry {
        let slug = title.to_lowercase().replace(' ', "-");
        NewPdfEntry::new(title, "Ebooks", format!("https://media.test/image/{}.png", slug))
            .with_drive_link(format!("https://drive.test/{}", slug))
            .with_maketou_link(format!("https://maketou.test/{}", slug))
            .with_youtube_link(format!("https://youtube.test/{}", slug))
            .with_tiktok_link(format!("https://tiktok.test/{}", slug))
            .with_facebook_link(format!("https://facebook.test/{}", slug))
    }

    /// A valid configuration pointing at nothing real.
    pub fn test_config() -> Config {
        Config {
            auth: AuthConfig {
                admin_token: ADMIN_TOKEN.to_string(),
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            media_host: MediaHostConfig {
                cloud_name: "demo".to_string(),
                api_key: "media-key".to_string(),
                api_secret: "media-secret".to_string(),
                api_base: "http://127.0.0.1:1".to_string(),
                cover_folder: "pdf_covers".to_string(),
                timeout_secs: 5,
            },
            image_generation: ImageGenerationConfig {
                api_key: "gemini-key".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_base: "http://127.0.0.1:1".to_string(),
                api_version: "v1".to_string(),
                response_mime_type: "image/png".to_string(),
                timeout_secs: 5,
            },
        }
    }
}
