//! Mock image generator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::imagegen::{GeneratedImage, GenerationError, ImageGenerator};

/// Mock implementation of the ImageGenerator trait.
#[derive(Debug)]
pub struct MockImageGenerator {
    image: Arc<RwLock<GeneratedImage>>,
    prompts: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<GenerationError>>>,
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageGenerator {
    /// Returns a 1x1 PNG until told otherwise.
    pub fn new() -> Self {
        Self {
            image: Arc::new(RwLock::new(super::fixtures::png_image())),
            prompts: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_image(&self, image: GeneratedImage) {
        *self.image.write().await = image;
    }

    /// Configure the next generation to fail with the given error.
    pub async fn set_next_error(&self, error: GenerationError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    pub async fn generation_count(&self) -> usize {
        self.prompts.read().await.len()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-image-model"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        self.prompts.write().await.push(prompt.to_string());
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.image.read().await.clone())
    }
}
