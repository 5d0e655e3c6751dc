use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use serde_json::{json, Value};
use reqwest::Client;
use url::Url;
use log::{debug, error};

use crate::app_config::{ApiKey, TranslationConfig};
use crate::errors::ProviderError;
use crate::translation::prompts::TranslationPrompt;
use super::Provider;

/// Gemini client for the generative-language `generateContent` endpoint
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature sent with every request
    temperature: f32,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns
    contents: Vec<GeminiContent>,

    /// System prompt to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,

    /// Sampling and output-format settings
    generation_config: GenerationConfig,
}

/// A turn of content made of text parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// "user" or "model"; absent for system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// One content part; only text parts are used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation settings
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    /// Token usage information
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,

    /// Set when the prompt itself was blocked
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single generated candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// Prompt safety feedback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart { text: Some(text.into()) }],
        }
    }
}

impl Default for GeminiRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self {
            contents: Vec::new(),
            system_instruction: None,
            generation_config: GenerationConfig::default(),
        }
    }

    /// Add a user turn
    pub fn add_user_message(mut self, content: impl Into<String>) -> Self {
        self.contents.push(GeminiContent::text(Some("user"), content));
        self
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(GeminiContent::text(None, system));
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Constrain the output to a JSON array of strings
    pub fn string_array_output(mut self) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self.generation_config.response_schema = Some(json!({
            "type": "ARRAY",
            "items": { "type": "STRING" }
        }));
        self
    }
}

impl Gemini {
    /// Create a new Gemini client with default timeout and temperature
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new_with_config(endpoint, model, 120, 0.3)
    }

    /// Create a new Gemini client with explicit settings
    pub fn new_with_config(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
        })
    }

    /// Build a client from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        Self::new_with_config(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs,
            config.common.temperature,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the generateContent method for the configured model
    pub fn generate_url(&self) -> Result<Url, ProviderError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        Url::parse(&raw).map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint URL {}: {}", raw, e)))
    }

    /// Send a generateContent request
    pub async fn generate_content(&self, request: &GeminiRequest, api_key: &ApiKey) -> Result<GeminiResponse, ProviderError> {
        let url = self.generate_url()?;
        debug!("Sending generateContent request to model {}", self.model);

        let response = self.client.post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = Self::error_from_status(status.as_u16(), &body);
            error!("Gemini API error ({}): {}", status, err);
            return Err(err);
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))?;

        if parsed.candidates.is_empty() {
            let reason = parsed.prompt_feedback.as_ref()
                .and_then(|f| f.block_reason.clone())
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(ProviderError::ParseError(format!("Gemini returned no output: {}", reason)));
        }

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini usage: {} prompt tokens, {} output tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }

    /// Map a failed HTTP status and its body to a provider error
    pub fn error_from_status(status_code: u16, body: &str) -> ProviderError {
        let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.status),
            Err(_) => (body.trim().to_string(), String::new()),
        };

        if status_code == 429 || api_status == "RESOURCE_EXHAUSTED" {
            return ProviderError::RateLimitExceeded(message);
        }

        if status_code == 401
            || status_code == 403
            || api_status == "UNAUTHENTICATED"
            || api_status == "PERMISSION_DENIED"
            || body.contains("API_KEY_INVALID")
        {
            return ProviderError::AuthenticationError(message);
        }

        ProviderError::ApiError { status_code, message }
    }

    /// Concatenate the text parts of the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> String {
        response.candidates.first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content.parts.iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    fn build_request(&self, prompt: &TranslationPrompt) -> GeminiRequest {
        GeminiRequest::new()
            .system(&prompt.system_instruction)
            .add_user_message(prompt.user_content())
            .temperature(self.temperature)
            .string_array_output()
    }

    async fn complete(&self, request: GeminiRequest, api_key: &ApiKey) -> Result<GeminiResponse, ProviderError> {
        self.generate_content(&request, api_key).await
    }

    fn extract_text(response: &GeminiResponse) -> String {
        Self::extract_text_from_response(response)
    }
}
