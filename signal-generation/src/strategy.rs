// Strategy synthesis
// Joins the KOL analysis, the on-chain analysis and the raw KOL data into one
// request for the strategy maker

use anyhow::Result;
use research_agents::{AgentConfig, AnalystAgent, ChatProvider, SINGLE_TURN};
use std::sync::Arc;
use tracing::{info, warn};

use common::{JoinedResult, PipelineError, SynthesisResult};

/// Synthesis stage backed by the StrategyMaker persona
#[derive(Clone)]
pub struct StrategyMaker {
    agent: AnalystAgent,
}

impl StrategyMaker {
    pub fn new(agent: AnalystAgent) -> Self {
        Self { agent }
    }

    pub fn from_provider(provider: Arc<dyn ChatProvider>) -> Result<Self> {
        Self::with_max_turns(provider, SINGLE_TURN)
    }

    /// Fails unless `max_turns` is a single turn
    pub fn with_max_turns(provider: Arc<dyn ChatProvider>, max_turns: u32) -> Result<Self> {
        let config = AgentConfig::strategy_maker().with_max_turns(max_turns);
        Ok(Self::new(AnalystAgent::new(config, provider)?))
    }

    /// Single synthesis call, mapped onto the terminal result
    pub async fn synthesize(&self, joined: JoinedResult) -> SynthesisResult {
        match self.try_synthesize(joined).await {
            Ok(text) => SynthesisResult::strategy(text),
            Err(e) => SynthesisResult::error(e),
        }
    }

    pub async fn try_synthesize(&self, joined: JoinedResult) -> Result<String, PipelineError> {
        let failed = joined.failed_branches();
        if !failed.is_empty() {
            warn!("Synthesizing with degraded inputs: {:?}", failed);
        }
        if joined.kol_raw.is_unavailable() {
            warn!("Synthesizing without raw KOL data");
        }

        let prompt = strategy_prompt(&joined);
        info!("Requesting trading strategy ({} chars of context)", prompt.len());

        self.agent
            .ask(&prompt)
            .await
            .map_err(PipelineError::Synthesis)
    }
}

/// Build the combined request. Failed analyses are embedded with their reason.
pub fn strategy_prompt(joined: &JoinedResult) -> String {
    format!(
        "Build a trading strategy from the following two data sources:\n\
         \n\
         1. KOL data analysis:\n\
         {kol_analysis}\n\
         \n\
         2. On-chain data analysis:\n\
         {market_analysis}\n\
         \n\
         3. Raw KOL data:\n\
         {kol_raw}\n\
         \n\
         Please provide:\n\
         1. Detailed trading strategy steps\n\
         2. The specific reasoning behind each decision\n\
         3. Risk assessment and control measures\n",
        kol_analysis = joined.kol_analysis.render(),
        market_analysis = joined.market_analysis.render(),
        kol_raw = joined.kol_raw.render(),
    )
}
