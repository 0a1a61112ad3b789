//! Analyst agents
//!
//! An agent is a persona (system message) bound to a [`ChatProvider`]. Each
//! call is a single-shot exchange: one request, one response.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{ChatMessage, ChatProvider, ChatRequest, SINGLE_TURN};
use common::{AnalysisOutcome, LlmError};

/// Base configuration for any agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    pub name: String,
    pub system_message: String,
    pub max_turns: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: Uuid::new_v4().to_string(),
            name: "UnnamedAgent".to_string(),
            system_message: "You are a helpful assistant".to_string(),
            max_turns: SINGLE_TURN,
        }
    }
}

impl AgentConfig {
    fn persona(agent_id: &str, name: &str, system_message: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            name: name.to_string(),
            system_message: system_message.to_string(),
            max_turns: SINGLE_TURN,
        }
    }

    /// Reads market trends out of Twitter KOL posts
    pub fn kol_monitor() -> Self {
        Self::persona(
            "kol-monitor",
            "KOLMonitor",
            "You are a professional Web3 trading analyst. You analyse market trends \
             based on content published by Twitter KOLs.",
        )
    }

    /// Reads market trends out of real-time on-chain data
    pub fn market_data_analyst() -> Self {
        Self::persona(
            "market-data-analyst",
            "MarketDataAnalyst",
            "You are a professional Web3 trading analyst. You analyse market trends \
             based on real-time on-chain data.",
        )
    }

    /// Turns both analyses into a trading strategy
    pub fn strategy_maker() -> Self {
        Self::persona(
            "strategy-maker",
            "StrategyMaker",
            "You are a professional Web3 trading decision maker. You combine the results \
             of the KOLMonitor and MarketDataAnalyst analyses into a trading strategy.",
        )
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// A persona bound to a provider
#[derive(Clone)]
pub struct AnalystAgent {
    config: AgentConfig,
    provider: Arc<dyn ChatProvider>,
}

impl AnalystAgent {
    /// Only single-turn agents are supported
    pub fn new(config: AgentConfig, provider: Arc<dyn ChatProvider>) -> Result<Self> {
        ensure!(
            config.max_turns == SINGLE_TURN,
            "agent {} requested max_turns={}, only single-turn exchanges are supported",
            config.name,
            config.max_turns
        );
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn build_request(&self, context: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(self.config.system_message.clone()),
                ChatMessage::user(context),
            ],
            max_turns: self.config.max_turns,
        }
    }

    /// One exchange with the provider
    pub async fn ask(&self, context: &str) -> Result<String, LlmError> {
        let started = Instant::now();
        info!(
            "{} asking {} ({}) with {} chars of context",
            self.config.name,
            self.provider.name(),
            self.provider.model(),
            context.len()
        );

        let result = self.provider.complete(self.build_request(context)).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(text) => info!("✅ {} answered in {}ms ({} chars)", self.config.name, elapsed_ms, text.len()),
            Err(e) => warn!("{} failed after {}ms: {}", self.config.name, elapsed_ms, e),
        }
        result
    }

    /// Like [`ask`](Self::ask), with the failure kept as data
    pub async fn analyze(&self, context: &str) -> AnalysisOutcome {
        AnalysisOutcome::from_result(self.ask(context).await)
    }
}
