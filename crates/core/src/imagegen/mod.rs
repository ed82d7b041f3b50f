//! Text-to-image generation.

mod gemini;
mod types;

pub use gemini::GeminiImageGenerator;
pub use types::*;

use async_trait::async_trait;

/// Trait for image generation providers.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Provider name (e.g., "gemini")
    fn provider(&self) -> &str;

    /// Model name (e.g., "gemini-1.5-flash")
    fn model(&self) -> &str;

    /// Generate one image from a text prompt.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerationError>;
}
