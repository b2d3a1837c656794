//! OpenAI chat-completions client for narrative deal reports.

use crate::core::prompt::{deal_payload, user_prompt, SYSTEM_PROMPT};
use crate::domain::model::{Deal, DealFilter};
use crate::domain::ports::ReportGenerator;
use crate::utils::error::{IntelError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl AiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    code: Option<String>,
    r#type: Option<String>,
}

pub struct OpenAiReportGenerator {
    client: Client,
    settings: AiSettings,
}

impl OpenAiReportGenerator {
    pub fn new(settings: AiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(IntelError::MissingConfigError {
                field: "ai.api_key".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn map_error_status(status: StatusCode, body: &str) -> IntelError {
        let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| body.trim().to_string());
        let quota_exhausted = detail.as_ref().is_some_and(|d| {
            d.code.as_deref() == Some("insufficient_quota")
                || d.r#type.as_deref() == Some("insufficient_quota")
        });

        match status.as_u16() {
            401 => IntelError::AiAuthError,
            402 => IntelError::AiBillingError { message },
            429 if quota_exhausted => IntelError::AiBillingError { message },
            429 => IntelError::AiRateLimited,
            code => IntelError::AiResponseError {
                status: code,
                message,
            },
        }
    }
}

#[async_trait]
impl ReportGenerator for OpenAiReportGenerator {
    async fn generate_report(&self, deals: &[Deal], filter: &DealFilter) -> Result<String> {
        let deal_data = deal_payload(deals)?;
        let prompt = user_prompt(&deal_data, filter);

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        tracing::debug!(
            "Requesting AI report from {} (model: {}, deals: {})",
            self.endpoint(),
            self.settings.model,
            deals.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("AI provider response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, &body));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| IntelError::ProcessingError {
                message: "AI provider returned no report content".to_string(),
            })
    }
}
