//! Pipeline configuration
//!
//! Loaded once at process start (defaults, then an optional TOML file, then
//! environment overrides) and handed to each component by value.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Overall pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// KOL posts feed
    #[serde(default)]
    pub kol: KolFeedSettings,

    /// Language model providers
    #[serde(default)]
    pub llm: LlmSettings,
}

/// Settings for the KOL posts endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KolFeedSettings {
    /// Full URL of the getKolPosts endpoint
    #[serde(default = "default_kol_url")]
    pub base_url: String,

    /// Look-back window in hours
    #[serde(default = "default_kol_hours")]
    pub hours: i64,

    /// Maximum number of posts requested
    #[serde(default = "default_kol_limit")]
    pub limit: i64,

    /// Request timeout in seconds
    #[serde(default = "default_kol_timeout")]
    pub timeout_secs: u64,
}

impl Default for KolFeedSettings {
    fn default() -> Self {
        Self {
            base_url: default_kol_url(),
            hours: default_kol_hours(),
            limit: default_kol_limit(),
            timeout_secs: default_kol_timeout(),
        }
    }
}

fn default_kol_url() -> String {
    "http://127.0.0.1:5555/ai/api/twitter/getKolPosts".to_string()
}

fn default_kol_hours() -> i64 {
    4
}

fn default_kol_limit() -> i64 {
    100
}

fn default_kol_timeout() -> u64 {
    15
}

/// Which provider backs the analyst agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(anyhow!("unknown LLM provider: {}", other)),
        }
    }
}

/// Connection settings for one OpenAI-compatible provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Never written back out by `save_config`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn openai() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            timeout_secs: default_llm_timeout(),
        }
    }

    pub fn deepseek() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: default_llm_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

fn default_llm_timeout() -> u64 {
    120
}

/// Language model settings shared by every agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider used by the analysts and the strategy maker
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Turn bound per agent conversation
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    #[serde(default = "ProviderSettings::openai")]
    pub openai: ProviderSettings,

    #[serde(default = "ProviderSettings::deepseek")]
    pub deepseek: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_turns: default_max_turns(),
            openai: ProviderSettings::openai(),
            deepseek: ProviderSettings::deepseek(),
        }
    }
}

impl LlmSettings {
    pub fn provider_settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::DeepSeek => &self.deepseek,
        }
    }

    pub fn active(&self) -> &ProviderSettings {
        self.provider_settings(self.provider)
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::DeepSeek
}

fn default_max_turns() -> u32 {
    1
}

impl PipelineConfig {
    /// Load configuration for this process
    ///
    /// Reads `.env` if present, then the TOML file named by `PIPELINE_CONFIG`,
    /// then environment overrides.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let mut config = match std::env::var("PIPELINE_CONFIG") {
            Ok(path) => {
                info!("Loading configuration from {}", path);
                load_config(&path)?
            }
            Err(_) => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("KOL_API_BASE_URL").or_else(|| lookup("TWITTER_API_BASE_URL")) {
            self.kol.base_url = url;
        }

        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.openai.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.openai.base_url = url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.llm.openai.model = model;
        }

        if let Some(key) = lookup("DEEPSEEK_API_KEY") {
            self.llm.deepseek.api_key = Some(key);
        }
        if let Some(url) = lookup("DEEPSEEK_BASE_URL") {
            self.llm.deepseek.base_url = url;
        }
        if let Some(model) = lookup("DEEPSEEK_MODEL") {
            self.llm.deepseek.model = model;
        }

        Ok(())
    }

    /// Render the commented TOML template
    pub fn template() -> &'static str {
        CONFIG_TEMPLATE
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to TOML file
pub fn save_config(config: &PipelineConfig, path: &str) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template
pub fn create_config_template(path: &str) -> Result<()> {
    std::fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}

const CONFIG_TEMPLATE: &str = "# KOL / On-chain Trading Pipeline Configuration
# API keys are usually supplied through the environment
# (OPENAI_API_KEY, DEEPSEEK_API_KEY) rather than this file.

[kol]
# getKolPosts endpoint
base_url = \"http://127.0.0.1:5555/ai/api/twitter/getKolPosts\"

# Look-back window in hours (clamped to at least 1)
hours = 4

# Maximum posts requested (clamped to at most 1000)
limit = 100

# Request timeout (seconds)
timeout_secs = 15

[llm]
# Provider backing every agent: \"deepseek\" or \"openai\"
provider = \"deepseek\"

# Conversation turns per agent
max_turns = 1

[llm.openai]
base_url = \"https://api.openai.com/v1\"
model = \"gpt-4o\"
timeout_secs = 120

[llm.deepseek]
base_url = \"https://api.deepseek.com/v1\"
model = \"deepseek-chat\"
timeout_secs = 120
";
