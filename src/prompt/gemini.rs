//! Gemini (Google) text generation for video prompts.

use crate::error::{AdGeniusError, Result};
use crate::google::{self, API_KEY_HEADER, DEFAULT_BASE_URL};
use crate::prompt::provider::{PromptProvider, PromptRequest};
use crate::prompt::template::{user_prompt, SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default sampling temperature for prompt writing.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Gemini text model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiTextModel {
    /// Gemini 3 Flash Preview.
    #[default]
    Gemini3FlashPreview,
}

impl GeminiTextModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini3FlashPreview => "gemini-3-flash-preview",
        }
    }
}

/// Builder for GeminiPromptProvider.
#[derive(Debug, Clone)]
pub struct GeminiPromptProviderBuilder {
    api_key: Option<String>,
    model: GeminiTextModel,
    temperature: f32,
    base_url: String,
}

impl Default for GeminiPromptProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GeminiTextModel::default(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiPromptProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model variant.
    pub fn model(mut self, model: GeminiTextModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiPromptProvider> {
        let api_key = google::resolve_api_key(self.api_key).ok_or_else(|| {
            AdGeniusError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
        })?;

        Ok(GeminiPromptProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            temperature: self.temperature,
            base_url: self.base_url,
        })
    }
}

/// Gemini prompt writer.
pub struct GeminiPromptProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiTextModel,
    temperature: f32,
    base_url: String,
}

impl GeminiPromptProvider {
    /// Creates a new `GeminiPromptProviderBuilder`.
    pub fn builder() -> GeminiPromptProviderBuilder {
        GeminiPromptProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiTextModel {
        self.model
    }

    async fn generate_impl(&self, request: &PromptRequest) -> Result<String> {
        let start = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_prompt_request(request, self.temperature);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(google::parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let text = gemini_response.into_text()?;

        tracing::debug!(
            model = self.model.as_str(),
            images = request.images.len(),
            chars = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generated video prompt"
        );
        Ok(text)
    }
}

#[async_trait]
impl PromptProvider for GeminiPromptProvider {
    async fn generate(&self, request: &PromptRequest) -> Result<String> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(google::parse_error(status.as_u16(), &text, &headers))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    temperature: f32,
}

impl GeminiRequest {
    fn from_prompt_request(req: &PromptRequest, temperature: f32) -> Self {
        let mut parts = vec![GeminiRequestPart::Text {
            text: user_prompt(&req.config),
        }];

        parts.extend(req.images.all().into_iter().map(|image| {
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type(),
                    data: image.base64_payload().to_string(),
                },
            }
        }));

        Self {
            contents: vec![GeminiContent { parts }],
            system_instruction: GeminiContent {
                parts: vec![GeminiRequestPart::Text {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GeminiConfig { temperature },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        // Blocks come back as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(AdGeniusError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            AdGeniusError::EmptyResponse("No candidates in Gemini response".into())
        })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            if matches!(
                finish_reason.as_str(),
                "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII"
            ) {
                return Err(AdGeniusError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdGeniusError::EmptyResponse(
                "Gemini returned no prompt text".into(),
            ));
        }
        Ok(text)
    }
}
