//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling comprehensive E2E testing
//! without external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pdfshelf_core::{
    testing::{MockImageGenerator, MockMediaHost, MockPdfCatalog},
    AdminTokenAuthenticator, PdfCatalog, SqlitePdfCatalog,
};
use pdfshelf_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use pdfshelf_core::testing::fixtures;

/// Body of the fallback document written into the static dir.
pub const INDEX_HTML: &str = "<!doctype html><html><body><div id=\"root\"></div></body></html>";

/// Boundary used by [`TestFixture::post_multipart`].
const BOUNDARY: &str = "pdfshelf-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The catalogue store (MockPdfCatalog, unless SQLite is requested)
/// - The media host (MockMediaHost)
/// - Image generation (MockImageGenerator)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_create_entry() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post_admin("/api/pdfs", json!({
///         "title": "T", "category": "C", "image_url": "http://x/y.png"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalogue - inspect calls or inject failures
    pub catalog: Arc<MockPdfCatalog>,
    /// Mock media host - inspect uploads or inject failures
    pub media_host: Arc<MockMediaHost>,
    /// Mock image generator - configure images or inject failures
    pub image_generator: Arc<MockImageGenerator>,
    /// Temporary directory for static files and the optional database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is empty or not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Back the catalogue with a real SQLite file instead of the mock
    pub use_sqlite: bool,
    /// Override the multipart body limit
    pub max_upload_bytes: Option<usize>,
}

impl TestConfig {
    pub fn with_sqlite() -> Self {
        Self {
            use_sqlite: true,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        // Static dir with the fallback document and one real asset
        let static_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(static_dir.join("assets")).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), INDEX_HTML).expect("Failed to write index");
        std::fs::write(static_dir.join("assets/app.js"), "console.log('pdfshelf');")
            .expect("Failed to write asset");

        let mut config = fixtures::test_config();
        config.server.static_dir = static_dir;
        config.database.path = temp_dir.path().join("test.db");
        if let Some(limit) = test_config.max_upload_bytes {
            config.server.max_upload_bytes = limit;
        }

        // Create mocks
        let catalog = Arc::new(MockPdfCatalog::new());
        let media_host = Arc::new(MockMediaHost::new());
        let image_generator = Arc::new(MockImageGenerator::new());

        let store: Arc<dyn PdfCatalog> = if test_config.use_sqlite {
            Arc::new(
                SqlitePdfCatalog::new(&config.database.path).expect("Failed to open catalogue"),
            )
        } else {
            Arc::clone(&catalog) as Arc<dyn PdfCatalog>
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::new(AdminTokenAuthenticator::new(fixtures::ADMIN_TOKEN)),
            store,
            Arc::clone(&media_host) as Arc<dyn pdfshelf_core::MediaHost>,
            Arc::clone(&image_generator) as Arc<dyn pdfshelf_core::ImageGenerator>,
        ));

        let router = create_router(state);

        Self {
            router,
            catalog,
            media_host,
            image_generator,
            temp_dir,
        }
    }

    /// `Authorization` header value carrying the admin token.
    pub fn admin_auth() -> String {
        format!("Bearer {}", fixtures::ADMIN_TOKEN)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body and no credentials.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request with JSON body as the admin.
    pub async fn post_admin(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), Some(&Self::admin_auth()))
            .await
    }

    /// Send a POST request with JSON body and an arbitrary `Authorization` value.
    pub async fn post_with_auth(&self, path: &str, body: Value, auth: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(auth)).await
    }

    /// Send a DELETE request with no credentials.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, None).await
    }

    /// Send a DELETE request as the admin.
    pub async fn delete_admin(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(&Self::admin_auth()))
            .await
    }

    /// Send a POST request as the admin with a raw body (for malformed input).
    pub async fn post_raw_admin(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::AUTHORIZATION, Self::admin_auth())
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart POST with the given `(field name, file name, bytes)` parts.
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: &[(&str, Option<&str>, &[u8])],
        auth: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder().method("POST").uri(path).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }

        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        auth: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(auth) = auth {
            request_builder = request_builder.header(header::AUTHORIZATION, auth);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}
