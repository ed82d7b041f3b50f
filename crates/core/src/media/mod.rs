//! Media host - durable storage for uploaded PDFs and cover images.

mod cloudinary;
mod types;

pub use cloudinary::CloudinaryHost;
pub use types::*;

use async_trait::async_trait;

/// Trait for media hosting backends.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Backend name (e.g., "cloudinary")
    fn name(&self) -> &str;

    /// Upload one asset and return where it now lives.
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError>;
}
