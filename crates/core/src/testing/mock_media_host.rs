//! Mock media host for testing.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::media::{MediaError, MediaHost, ResourceType, UploadRequest, UploadSource, UploadedAsset};

/// What the mock received for the file part.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedPayload {
    /// Streamed bytes, concatenated.
    Bytes(Vec<u8>),
    DataUrl(String),
}

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub resource_type: ResourceType,
    pub format: Option<String>,
    pub folder: Option<String>,
    pub file_name: Option<String>,
    pub payload: RecordedPayload,
}

/// Mock implementation of the MediaHost trait.
///
/// Drains streamed uploads fully, so a stream that errors midway surfaces
/// as `MediaError::Stream` just as it would against the real host.
#[derive(Debug)]
pub struct MockMediaHost {
    base_url: String,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    next_error: Arc<RwLock<Option<MediaError>>>,
}

impl Default for MockMediaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaHost {
    pub fn new() -> Self {
        Self::with_base_url("https://media.test")
    }

    /// Secure URLs are `{base_url}/{resource_type}/{n}`, `n` counting from 1.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            uploads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: MediaError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }
}

#[async_trait]
impl MediaHost for MockMediaHost {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        let payload = match request.source {
            UploadSource::Stream(mut stream) => {
                let mut bytes = Vec::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| MediaError::Stream(e.to_string()))?;
                    bytes.extend_from_slice(&chunk);
                }
                RecordedPayload::Bytes(bytes)
            }
            UploadSource::DataUrl(url) => RecordedPayload::DataUrl(url),
        };

        let size = match &payload {
            RecordedPayload::Bytes(bytes) => bytes.len() as u64,
            RecordedPayload::DataUrl(url) => url.len() as u64,
        };

        let mut uploads = self.uploads.write().await;
        uploads.push(RecordedUpload {
            resource_type: request.resource_type,
            format: request.format,
            folder: request.folder,
            file_name: request.file_name,
            payload,
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let n = uploads.len();
        Ok(UploadedAsset {
            secure_url: format!("{}/{}/{}", self.base_url, request.resource_type.as_str(), n),
            public_id: Some(format!("mock-{}", n)),
            bytes: Some(size),
        })
    }
}
