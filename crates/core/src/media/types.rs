//! Types for media host uploads.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte stream forwarded to the media host without being buffered whole.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static>>;

/// Error type for media host operations.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upload stream failed: {0}")]
    Stream(String),
}

/// Resource class on the media host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Image,
    /// Opaque files such as PDFs.
    Raw,
    Auto,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Raw => "raw",
            ResourceType::Auto => "auto",
        }
    }
}

/// What is being uploaded.
pub enum UploadSource {
    /// Binary payload, forwarded chunk by chunk.
    Stream(ByteStream),
    /// A `data:<mime>;base64,<payload>` URL.
    DataUrl(String),
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Stream(_) => f.write_str("Stream(<bytes>)"),
            UploadSource::DataUrl(url) => write!(f, "DataUrl({} chars)", url.len()),
        }
    }
}

/// A single upload to the media host.
#[derive(Debug)]
pub struct UploadRequest {
    pub source: UploadSource,
    pub resource_type: ResourceType,
    /// Format the host should record (e.g., "pdf").
    pub format: Option<String>,
    /// Destination folder on the host.
    pub folder: Option<String>,
    /// Original file name, if the client sent one.
    pub file_name: Option<String>,
}

impl UploadRequest {
    /// A PDF stored as a raw resource with format `pdf`.
    pub fn raw_pdf(stream: ByteStream) -> Self {
        Self {
            source: UploadSource::Stream(stream),
            resource_type: ResourceType::Raw,
            format: Some("pdf".to_string()),
            folder: None,
            file_name: None,
        }
    }

    /// An image given as a data URL, stored in `folder`.
    pub fn image_data_url(data_url: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            source: UploadSource::DataUrl(data_url.into()),
            resource_type: ResourceType::Image,
            format: None,
            folder: Some(folder.into()),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Durable HTTPS URL of the stored asset.
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}
