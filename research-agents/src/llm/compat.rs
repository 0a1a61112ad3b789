// OpenAI-compatible chat completions wire format, shared by both providers

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::ChatRequest;
use common::{LlmError, ProviderSettings};

pub(crate) struct CompatClient {
    http: HttpClient,
    settings: ProviderSettings,
    provider: &'static str,
}

impl CompatClient {
    pub(crate) fn new(provider: &'static str, settings: ProviderSettings) -> Result<Self, LlmError> {
        let http = HttpClient::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(LlmError::from_reqwest)?;
        Ok(Self {
            http,
            settings,
            provider,
        })
    }

    pub(crate) fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey {
                provider: self.provider,
            })
    }

    pub(crate) fn build_body(&self, request: &ChatRequest, stream: Option<bool>) -> ApiChatRequest {
        ApiChatRequest {
            model: self.settings.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ApiChatMessage {
                    role: m.role.as_api_str().to_string(),
                    content: Some(m.content.clone()),
                    reasoning_content: None,
                })
                .collect(),
            stream,
        }
    }

    pub(crate) async fn send(&self, body: &ApiChatRequest) -> Result<ApiChatResponse, LlmError> {
        if body.messages.is_empty() {
            return Err(LlmError::EmptyMessages);
        }
        let api_key = self.api_key()?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(LlmError::from_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            return Err(LlmError::Api { status, message });
        }

        serde_json::from_slice(&bytes).map_err(LlmError::Decode)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiChatRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ApiChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiChatMessage {
    pub(crate) role: String,
    pub(crate) content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reasoning_content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiChatResponse {
    pub(crate) choices: Vec<ApiChatChoice>,
}

impl ApiChatResponse {
    /// First non-blank completion text
    pub(crate) fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .find_map(|choice| choice.message.content.filter(|c| !c.trim().is_empty()))
            .ok_or(LlmError::EmptyCompletion)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiChatChoice {
    pub(crate) message: ApiChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}
