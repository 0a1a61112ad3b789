use async_trait::async_trait;
use tracing::debug;

use super::compat::CompatClient;
use super::{ChatProvider, ChatRequest};
use common::{LlmError, ProviderSettings};

/// DeepSeek chat completions (OpenAI-compatible endpoint, non-streaming)
///
/// Reasoner models also return `reasoning_content`; only the final answer is
/// handed back to the agent.
pub struct DeepSeekProvider {
    client: CompatClient,
}

impl DeepSeekProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: CompatClient::new("deepseek", settings)?,
        })
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn model(&self) -> &str {
        self.client.model()
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let body = self.client.build_body(&request, Some(false));
        debug!("deepseek request: model={} messages={}", body.model, body.messages.len());

        let response = self.client.send(&body).await?;
        if let Some(reasoning) = response
            .choices
            .first()
            .and_then(|choice| choice.message.reasoning_content.as_ref())
        {
            debug!("deepseek reasoning trace: {} chars", reasoning.len());
        }
        response.into_text()
    }
}
