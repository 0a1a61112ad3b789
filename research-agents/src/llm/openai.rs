use async_trait::async_trait;
use tracing::debug;

use super::compat::CompatClient;
use super::{ChatProvider, ChatRequest};
use common::{LlmError, ProviderSettings};

/// OpenAI chat completions
pub struct OpenAiProvider {
    client: CompatClient,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: CompatClient::new("openai", settings)?,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        self.client.model()
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let body = self.client.build_body(&request, None);
        debug!("openai request: model={} messages={}", body.model, body.messages.len());
        self.client.send(&body).await?.into_text()
    }
}
