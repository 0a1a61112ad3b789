//! Single-shot remote calls to language models
//!
//! Every provider answers one request with one completion. The agents never
//! branch on which provider backs them.

use async_trait::async_trait;
use std::sync::Arc;

use common::{LlmError, LlmSettings, ProviderKind};

mod compat;
pub mod deepseek;
pub mod mock;
pub mod openai;

pub use deepseek::DeepSeekProvider;
pub use mock::{ScriptedProvider, ScriptedReply};
pub use openai::OpenAiProvider;

/// The only turn bound the agents support: one request, one response
pub const SINGLE_TURN: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }
}

/// One role-tagged conversation bounded to `max_turns` exchanges
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_turns: u32,
}

impl ChatRequest {
    pub fn single_turn(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_turns: SINGLE_TURN,
        }
    }

    /// Content of the last user message, if any
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Capability shared by every language model backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}

/// Build the provider selected in `settings`
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn ChatProvider>, LlmError> {
    build_provider_of(settings.provider, settings)
}

/// Build a specific provider from `settings`
pub fn build_provider_of(
    kind: ProviderKind,
    settings: &LlmSettings,
) -> Result<Arc<dyn ChatProvider>, LlmError> {
    let provider_settings = settings.provider_settings(kind).clone();
    let provider: Arc<dyn ChatProvider> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(provider_settings)?),
        ProviderKind::DeepSeek => Arc::new(DeepSeekProvider::new(provider_settings)?),
    };
    Ok(provider)
}
