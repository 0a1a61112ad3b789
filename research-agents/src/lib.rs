//! Research Agents Framework - Layer 1
//!
//! This crate provides the analysis side of the trading pipeline:
//! - Single-shot LLM providers behind one `ChatProvider` trait (OpenAI, DeepSeek)
//! - Analyst agents (KOL monitor, market data analyst, strategy maker personas)
//! - The KOL and market analysis branches
//! - The fan-out/fan-in orchestrator joining both branches

pub mod agent;
pub mod branches;
pub mod llm;
pub mod orchestrator;

// Re-export commonly used types
pub use agent::{AgentConfig, AnalystAgent};
pub use branches::{kol_prompt, market_prompt, KolBranch, KolBranchOutput, MarketBranch};
pub use llm::{
    build_provider, build_provider_of, ChatMessage, ChatProvider, ChatRequest, ChatRole,
    DeepSeekProvider, OpenAiProvider, ScriptedProvider, ScriptedReply, SINGLE_TURN,
};
pub use orchestrator::{panic_message, Orchestration, Orchestrator};

// Re-export common types for convenience
pub use common::{AnalysisOutcome, BranchId, JoinedResult, KolFeed};
