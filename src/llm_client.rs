//! LLM API client abstraction for Gemini, OpenAI and Anthropic.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini.
    #[display("gemini")]
    Gemini,
    /// OpenAI (GPT models).
    #[display("openai")]
    OpenAI,
    /// Anthropic (Claude models).
    #[display("anthropic")]
    Anthropic,
}

impl LlmProvider {
    /// Model used when the configuration does not name one.
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.5-flash",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-20241022",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// One completion request.
#[derive(Debug, Clone, derive_new::new)]
pub struct Completion<'a> {
    /// System prompt.
    pub system_prompt: &'a str,
    /// User message.
    pub user_message: &'a str,
    /// Ask the provider for a JSON object reply where it supports it.
    pub json: bool,
    /// Sampling temperature; provider default when `None`.
    pub temperature: Option<f32>,
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Runs a completion request against the configured provider.
    #[instrument(
        skip(self, request),
        fields(provider = ?self.config.provider, model = %self.config.model, json = request.json)
    )]
    pub async fn complete(&self, request: &Completion<'_>) -> Result<String, LlmError> {
        debug!("Generating completion");
        match self.config.provider {
            LlmProvider::Gemini => self.generate_gemini(request).await,
            LlmProvider::OpenAI => self.generate_openai(request).await,
            LlmProvider::Anthropic => self.generate_anthropic(request).await,
        }
    }

    fn gemini_request(&self, request: &Completion<'_>) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: request.system_prompt.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user_message.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: request.temperature,
                response_mime_type: request.json.then(|| "application/json".to_string()),
                thinking_config: gemini_thinking_config(&self.config.model),
            },
        }
    }

    /// Generates a completion using the Gemini REST API.
    #[instrument(skip(self, request))]
    async fn generate_gemini(&self, request: &Completion<'_>) -> Result<String, LlmError> {
        let body = self.gemini_request(request);

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.config.model);

        debug!("Sending request to Gemini");
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                LlmError::new(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Gemini API error");
            return Err(LlmError::new(format!(
                "Gemini API error {}: {}",
                status, response_text
            )));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse Gemini response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })?;

        let candidate = parsed.candidates.into_iter().next();
        let finish_reason = candidate
            .as_ref()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "none".to_string());
        let content = candidate
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                error!(%finish_reason, "No text content in Gemini response");
                LlmError::new(format!(
                    "No text content in Gemini response (finish reason: {})",
                    finish_reason
                ))
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, request))]
    async fn generate_anthropic(&self, request: &Completion<'_>) -> Result<String, LlmError> {
        debug!("Building Anthropic API request");
        let mut request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": request.system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": request.user_message
                }
            ]
        });
        if let Some(temperature) = request.temperature {
            request_body["temperature"] = serde_json::json!(temperature);
        }

        debug!("Sending request to Anthropic");
        let response = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                LlmError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(LlmError::new(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, response = %response_text, "Failed to parse Anthropic response");
                LlmError::new(format!("Failed to parse response: {}", e))
            })?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                LlmError::new("No text content in Anthropic response".to_string())
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using OpenAI.
    #[instrument(skip(self, request))]
    async fn generate_openai(&self, request: &Completion<'_>) -> Result<String, LlmError> {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new().with_api_key(self.config.api_key.clone()),
        );

        debug!("Building chat completion request");
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build system message");
                        LlmError::new(format!("Failed to build system message: {}", e))
                    })?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user_message)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build user message");
                        LlmError::new(format!("Failed to build user message: {}", e))
                    })?,
            ),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.config.model)
            .messages(messages)
            .max_completion_tokens(self.config.max_tokens);
        if request.json {
            builder.response_format(ResponseFormat::JsonObject);
        }
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        let chat_request = builder.build().map_err(|e| {
            error!(error = ?e, "Failed to build request");
            LlmError::new(format!("Failed to build request: {}", e))
        })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(chat_request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            LlmError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                LlmError::new("No content in OpenAI response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

/// Flash models think by default and spend the output budget doing it.
fn gemini_thinking_config(model: &str) -> Option<GeminiThinkingConfig> {
    model
        .contains("flash")
        .then_some(GeminiThinkingConfig { thinking_budget: 0 })
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str) -> LlmClient {
        LlmClient::new(LlmConfig::new(
            LlmProvider::Gemini,
            "test-key".to_string(),
            model.to_string(),
            10,
        ))
    }

    #[test]
    fn test_gemini_request_uses_camel_case() {
        let request = Completion::new("sys", "halo", true, None);
        let body = client("gemini-2.5-flash").gemini_request(&request);
        let json = serde_json::to_value(&body).expect("serialize");
        let generation = &json["generationConfig"];
        assert_eq!(generation["responseMimeType"], "application/json");
        assert_eq!(generation["maxOutputTokens"], 10);
        assert_eq!(generation["thinkingConfig"]["thinkingBudget"], 0);
        assert!(generation.get("temperature").is_none());
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "halo");
    }

    #[test]
    fn test_gemini_pro_request_keeps_default_thinking() {
        let request = Completion::new("sys", "halo", false, Some(0.7));
        let body = client("gemini-2.5-pro").gemini_request(&request);
        let json = serde_json::to_value(&body).expect("serialize");
        let generation = &json["generationConfig"];
        assert!(generation.get("thinkingConfig").is_none());
        assert!(generation.get("responseMimeType").is_none());
        assert!(generation["temperature"].as_f64().is_some());
    }

    #[test]
    fn test_gemini_response_tolerates_missing_content() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).expect("parse");
        assert!(parsed.candidates[0].content.is_none());
        assert_eq!(parsed.candidates[0].finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!(LlmProvider::Gemini.default_model(), "gemini-2.5-flash");
        assert_eq!(LlmProvider::Anthropic.api_key_var(), "ANTHROPIC_API_KEY");
        assert_eq!(LlmProvider::OpenAI.to_string(), "openai");
    }
}
