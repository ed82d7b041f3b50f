use axum::{http::header, response::IntoResponse, Json};
use serde::Serialize;

use crate::metrics::encode_metrics;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub message: String,
}

/// Liveness probe; touches nothing behind the server.
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: "Connecté à la base de données !".to_string(),
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
