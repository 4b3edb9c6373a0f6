use crate::LlmProvider;
use async_trait::async_trait;
use citypulse_core::{require_credentials, CoreError, LlmError, Sampling, OPENROUTER_API_KEY};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const PROVIDER_NAME: &str = "OpenRouter";

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl OpenRouterConfig {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: OPENROUTER_API_URL.to_string(),
            model: model.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    top_p: f32,
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug)]
pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    http: Client,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, http })
    }

    fn format_error(details: impl Into<String>) -> CoreError {
        CoreError::Llm(LlmError::InvalidResponseFormat {
            provider: PROVIDER_NAME.to_string(),
            details: details.into(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, prompt: &str, sampling: Sampling) -> Result<String, CoreError> {
        require_credentials(&[(OPENROUTER_API_KEY, self.config.api_key.as_deref())])?;
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            top_p: sampling.top_p,
            temperature: sampling.temperature,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
        };

        debug!(model = %self.config.model, ?sampling, "OpenRouter chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenRouter request failed: {}", e);
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER_NAME.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("OpenRouter API error ({}): {}", status, body);
            return Err(CoreError::Llm(LlmError::UpstreamStatus {
                provider: PROVIDER_NAME.to_string(),
                status: status.as_u16(),
                body,
            }));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Self::format_error(format!("unreadable completion body: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Self::format_error("no completion text in response"))
    }
}
