//! Gemini `generateContent` image generator.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GeneratedImage, GenerationError, ImageGenerator};
use crate::config::ImageGenerationConfig;
use crate::metrics::record_external_call;

/// Google Gemini API client.
pub struct GeminiImageGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    api_version: String,
    response_mime_type: String,
}

impl GeminiImageGenerator {
    pub fn new(config: ImageGenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            model: config.model,
            api_base: config.api_base,
            api_version: config.api_version,
            response_mime_type: config.response_mime_type,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.api_version,
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Pull the first candidate's first part as inline image data.
fn extract_image(
    response: GeminiResponse,
    fallback_mime: &str,
) -> Result<GeneratedImage, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MissingImageData("no candidates".to_string()))?;

    let content = candidate
        .content
        .ok_or_else(|| GenerationError::MissingImageData("candidate has no content".to_string()))?;

    let part = content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MissingImageData("content has no parts".to_string()))?;

    let inline = part
        .inline_data
        .ok_or_else(|| GenerationError::MissingImageData("part has no inlineData".to_string()))?;

    let mime_type = inline
        .mime_type
        .unwrap_or_else(|| fallback_mime.to_string());

    Ok(GeneratedImage::new(mime_type, inline.data))
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        let start = Instant::now();
        let result = self.send_generate(prompt).await;
        record_external_call(
            "gemini",
            "generate",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );
        result
    }
}

impl GeminiImageGenerator {
    async fn send_generate(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: self.response_mime_type.clone(),
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting image generation");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            warn!(status, message = %message, "Gemini request failed");
            return Err(GenerationError::Api { status, message });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Json(e.to_string()))?;

        extract_image(gemini_response, &self.response_mime_type)
    }
}
