//! Catalogue API handlers.

use axum::{
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::header,
    Form, Json,
};
use pdfshelf_core::{NewPdfEntry, PdfEntry};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::error::{ApiError, DATABASE_ERROR};
use crate::state::AppState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/pdfs - every entry, newest first.
pub async fn list_pdfs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PdfEntry>>, ApiError> {
    state.catalog().list().await.map(Json).map_err(|e| {
        error!(error = %e, "Failed to list PDFs");
        ApiError::downstream(DATABASE_ERROR)
    })
}

/// POST /api/pdfs
///
/// Accepts a JSON or urlencoded form body. Required fields are not checked
/// here; the store's rejection is relayed verbatim.
pub async fn create_pdf(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<PdfEntry>, ApiError> {
    let entry = read_new_entry(request).await?;

    let created = state.catalog().create(entry).await.map_err(|e| {
        error!(error = %e, "Failed to create PDF entry");
        ApiError::downstream(e.to_string())
    })?;

    info!(id = created.id, title = %created.title, "PDF entry created");
    Ok(Json(created))
}

/// Parse the body as a form when it says so, as JSON otherwise.
async fn read_new_entry(request: Request) -> Result<NewPdfEntry, ApiError> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE));

    if is_form {
        let Form(entry) = Form::<NewPdfEntry>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::downstream(rejection.body_text()))?;
        Ok(entry)
    } else {
        let Json(entry) = Json::<NewPdfEntry>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::downstream(rejection.body_text()))?;
        Ok(entry)
    }
}

/// DELETE /api/pdfs/{id} - succeeds whether or not the id existed.
pub async fn delete_pdf(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.map_err(|rejection| {
        error!(error = %rejection.body_text(), "Invalid PDF id");
        ApiError::downstream(rejection.body_text())
    })?;

    let removed = state.catalog().delete(id).await.map_err(|e| {
        error!(id, error = %e, "Failed to delete PDF entry");
        ApiError::downstream(e.to_string())
    })?;

    info!(id, removed, "PDF entry deleted");
    Ok(Json(DeleteResponse { success: true }))
}
