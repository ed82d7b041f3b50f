//! Upload and cover generation handlers.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use bytes::Bytes;
use futures::channel::mpsc;
use futures::SinkExt;
use pdfshelf_core::{ByteStream, UploadRequest};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::error::{ApiError, GENERATION_FAILED, UPLOAD_FAILED};
use crate::state::AppState;

/// Multipart field carrying the PDF.
pub const PDF_FIELD: &str = "pdf";

/// Chunks buffered between the request body and the media host upload.
const UPLOAD_CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageBody {
    /// Forwarded as-is; a missing prompt is sent as an empty string.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// POST /api/upload-pdf
///
/// The `pdf` field is streamed to the media host while it is still being
/// received.
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        error!(error = %rejection.body_text(), "Upload request is not multipart");
        ApiError::downstream(UPLOAD_FAILED)
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "Failed to read multipart body");
        ApiError::downstream(UPLOAD_FAILED)
    })? {
        if field.name() != Some(PDF_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }
        return stream_to_media_host(&state, field).await.map(Json);
    }

    error!("Upload request has no '{}' field", PDF_FIELD);
    Err(ApiError::downstream(UPLOAD_FAILED))
}

async fn stream_to_media_host(
    state: &AppState,
    field: Field<'_>,
) -> Result<UploadResponse, ApiError> {
    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(UPLOAD_CHANNEL_CAPACITY);
    let stream: ByteStream = Box::pin(rx);

    let mut request = UploadRequest::raw_pdf(stream);
    if let Some(file_name) = field.file_name() {
        request = request.with_file_name(file_name);
    }

    let ((), result) = tokio::join!(
        forward_field(field, tx),
        state.media_host().upload(request)
    );

    match result {
        Ok(asset) => {
            info!(url = %asset.secure_url, bytes = ?asset.bytes, "PDF uploaded");
            Ok(UploadResponse {
                url: asset.secure_url,
            })
        }
        Err(e) => {
            error!(error = %e, "PDF upload failed");
            Err(ApiError::downstream(UPLOAD_FAILED))
        }
    }
}

/// Pump field chunks into the upload channel until the field ends, the
/// upload stops listening, or the client connection fails.
async fn forward_field(mut field: Field<'_>, mut tx: mpsc::Sender<Result<Bytes, io::Error>>) {
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                let _ = tx.send(Err(io::Error::other(e.to_string()))).await;
                return;
            }
        }
    }
}

/// POST /api/generate-image
///
/// Generates a cover from the prompt, then stores it in the cover folder.
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateImageBody>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        error!(error = %rejection.body_text(), "Invalid image generation body");
        ApiError::downstream(GENERATION_FAILED)
    })?;

    let image = state
        .image_generator()
        .generate(&body.prompt)
        .await
        .map_err(|e| {
            let provider = state.image_generator().provider();
            error!(error = %e, provider, "Image generation failed");
            ApiError::downstream(GENERATION_FAILED)
        })?;

    let request = UploadRequest::image_data_url(
        image.to_data_url(),
        state.config().media_host.cover_folder.clone(),
    );

    let asset = state.media_host().upload(request).await.map_err(|e| {
        error!(error = %e, "Cover upload failed");
        ApiError::downstream(GENERATION_FAILED)
    })?;

    info!(url = %asset.secure_url, "Cover image generated");
    Ok(Json(GenerateImageResponse {
        image_url: asset.secure_url,
    }))
}
