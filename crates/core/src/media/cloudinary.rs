//! Cloudinary media host implementation.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{MediaError, MediaHost, UploadRequest, UploadSource, UploadedAsset};
use crate::config::MediaHostConfig;
use crate::metrics::record_external_call;

/// Cloudinary upload API client using signed uploads.
pub struct CloudinaryHost {
    client: Client,
    config: MediaHostConfig,
}

impl CloudinaryHost {
    pub fn new(config: MediaHostConfig) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| MediaError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn upload_url(&self, request: &UploadRequest) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            request.resource_type.as_str()
        )
    }

    /// Parameters that take part in the signature.
    fn signed_params(request: &UploadRequest, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if let Some(folder) = &request.folder {
            params.insert("folder", folder.clone());
        }
        if let Some(format) = &request.format {
            params.insert("format", format.clone());
        }
        params.insert("timestamp", timestamp.to_string());
        params
    }
}

/// Sign upload parameters: SHA-256 over `k1=v1&k2=v2...` (keys sorted)
/// followed by the API secret.
pub(crate) fn sign_params(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryError {
    error: CloudinaryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    fn name(&self) -> &str {
        "cloudinary"
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        let start = Instant::now();
        let operation = request.resource_type.as_str();
        let result = self.send_upload(request).await;
        record_external_call(
            "cloudinary",
            operation,
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );
        result
    }
}

impl CloudinaryHost {
    async fn send_upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        let url = self.upload_url(&request);
        let params = Self::signed_params(&request, Utc::now().timestamp());
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form = Form::new();
        for (key, value) in &params {
            form = form.text(*key, value.clone());
        }
        form = form
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        form = match request.source {
            UploadSource::Stream(stream) => {
                let file_name = request.file_name.unwrap_or_else(|| "upload".to_string());
                form.part(
                    "file",
                    Part::stream(reqwest::Body::wrap_stream(stream)).file_name(file_name),
                )
            }
            UploadSource::DataUrl(data_url) => form.text("file", data_url),
        };

        debug!(url = %url, "Uploading to Cloudinary");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Http(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CloudinaryError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            warn!(status, message = %message, "Cloudinary rejected upload");
            return Err(MediaError::Api { status, message });
        }

        let body: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        let secure_url = body.secure_url.ok_or_else(|| {
            MediaError::InvalidResponse("response has no secure_url".to_string())
        })?;

        Ok(UploadedAsset {
            secure_url,
            public_id: body.public_id,
            bytes: body.bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ByteStream;
    use axum::extract::{Multipart, Path, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Fields captured by the fake Cloudinary endpoint.
    #[derive(Debug, Default, Clone)]
    struct Captured {
        resource_type: String,
        fields: HashMap<String, String>,
        file_bytes: Vec<u8>,
        file_name: Option<String>,
    }

    type Shared = Arc<Mutex<Vec<Captured>>>;

    async fn fake_upload(
        State(captured): State<Shared>,
        Path((_cloud, resource_type)): Path<(String, String)>,
        mut multipart: Multipart,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let mut record = Captured {
            resource_type,
            ..Default::default()
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" && field.file_name().is_some() {
                record.file_name = field.file_name().map(|s| s.to_string());
                record.file_bytes = field.bytes().await.unwrap().to_vec();
            } else {
                let text = field.text().await.unwrap();
                record.fields.insert(name, text);
            }
        }
        let folder = record.fields.get("folder").cloned();
        captured.lock().unwrap().push(record);

        if folder.as_deref() == Some("forbidden") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": {"message": "Invalid Signature"}})),
            );
        }

        (
            StatusCode::OK,
            Json(serde_json::json!({
                "secure_url": "https://res.cloudinary.com/demo/raw/upload/v1/file.pdf",
                "public_id": "file",
                "bytes": 11
            })),
        )
    }

    async fn spawn_fake_cloudinary() -> (String, Shared) {
        let captured: Shared = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1_1/{cloud}/{resource_type}/upload", post(fake_upload))
            .with_state(Arc::clone(&captured));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn test_config(api_base: &str) -> MediaHostConfig {
        MediaHostConfig {
            cloud_name: "demo".to_string(),
            api_key: "key-123".to_string(),
            api_secret: "secret-456".to_string(),
            api_base: api_base.to_string(),
            cover_folder: "pdf_covers".to_string(),
            timeout_secs: 5,
        }
    }

    fn chunked(parts: &[&'static [u8]]) -> ByteStream {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
        Box::pin(futures::stream::iter(chunks))
    }

    #[test]
    fn test_sign_params_sorted_and_hashed() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("folder", "pdf_covers".to_string());

        let signature = sign_params(&params, "abcd");
        let expected = format!(
            "{:x}",
            Sha256::digest(b"folder=pdf_covers&timestamp=1315060510abcd")
        );
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_upload_url() {
        let host = CloudinaryHost::new(test_config("https://api.cloudinary.com/")).unwrap();
        let stream = chunked(&[b"x"]);
        let request = UploadRequest::raw_pdf(stream);
        assert_eq!(
            host.upload_url(&request),
            "https://api.cloudinary.com/v1_1/demo/raw/upload"
        );
    }

    #[tokio::test]
    async fn test_stream_upload_forwards_all_chunks() {
        let (base, captured) = spawn_fake_cloudinary().await;
        let host = CloudinaryHost::new(test_config(&base)).unwrap();

        let request =
            UploadRequest::raw_pdf(chunked(&[b"%PDF-", b"1.4 ", b"body"])).with_file_name("a.pdf");
        let asset = host.upload(request).await.unwrap();

        assert_eq!(
            asset.secure_url,
            "https://res.cloudinary.com/demo/raw/upload/v1/file.pdf"
        );
        assert_eq!(asset.public_id.as_deref(), Some("file"));

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let record = &captured[0];
        assert_eq!(record.resource_type, "raw");
        assert_eq!(record.file_bytes, b"%PDF-1.4 body");
        assert_eq!(record.file_name.as_deref(), Some("a.pdf"));
        assert_eq!(record.fields.get("format").map(String::as_str), Some("pdf"));
        assert_eq!(record.fields.get("api_key").map(String::as_str), Some("key-123"));
        assert!(!record.fields.contains_key("folder"));

        let timestamp = record.fields.get("timestamp").unwrap().clone();
        let mut params = BTreeMap::new();
        params.insert("format", "pdf".to_string());
        params.insert("timestamp", timestamp);
        assert_eq!(
            record.fields.get("signature"),
            Some(&sign_params(&params, "secret-456"))
        );
    }

    #[tokio::test]
    async fn test_data_url_upload_uses_folder() {
        let (base, captured) = spawn_fake_cloudinary().await;
        let host = CloudinaryHost::new(test_config(&base)).unwrap();

        let request = UploadRequest::image_data_url("data:image/png;base64,iVBORw0K", "pdf_covers");
        host.upload(request).await.unwrap();

        let captured = captured.lock().unwrap();
        let record = &captured[0];
        assert_eq!(record.resource_type, "image");
        assert_eq!(
            record.fields.get("file").map(String::as_str),
            Some("data:image/png;base64,iVBORw0K")
        );
        assert_eq!(
            record.fields.get("folder").map(String::as_str),
            Some("pdf_covers")
        );
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let (base, _captured) = spawn_fake_cloudinary().await;
        let host = CloudinaryHost::new(test_config(&base)).unwrap();

        let request = UploadRequest::image_data_url("data:image/png;base64,AA", "forbidden");
        let err = host.upload(request).await.unwrap_err();

        match err {
            MediaError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let host = CloudinaryHost::new(test_config("http://127.0.0.1:1")).unwrap();
        let request = UploadRequest::image_data_url("data:image/png;base64,AA", "pdf_covers");

        let err = host.upload(request).await.unwrap_err();
        assert!(matches!(err, MediaError::Http(_)));
    }

    #[test]
    fn test_name() {
        let host = CloudinaryHost::new(test_config("http://localhost")).unwrap();
        assert_eq!(host.name(), "cloudinary");
    }
}
