use pdfshelf_core::{Authenticator, Config, ImageGenerator, MediaHost, PdfCatalog};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn PdfCatalog>,
    media_host: Arc<dyn MediaHost>,
    image_generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn PdfCatalog>,
        media_host: Arc<dyn MediaHost>,
        image_generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            media_host,
            image_generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &dyn PdfCatalog {
        self.catalog.as_ref()
    }

    pub fn media_host(&self) -> &dyn MediaHost {
        self.media_host.as_ref()
    }

    pub fn image_generator(&self) -> &dyn ImageGenerator {
        self.image_generator.as_ref()
    }
}
