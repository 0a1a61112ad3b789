//! The two analysis branches launched by the orchestrator
//!
//! Branch A (KOL) ingests the KOL feed and then analyses it. Branch B
//! (market) analyses current on-chain conditions directly. The branches
//! share nothing mutable.

use tracing::info;

use crate::agent::AnalystAgent;
use common::{AnalysisOutcome, KolFeed};
use data_ingestion::IngestionStage;

/// Settled output of the KOL branch
#[derive(Debug, Clone, PartialEq)]
pub struct KolBranchOutput {
    pub raw: KolFeed,
    pub analysis: AnalysisOutcome,
}

/// Branch A: ingestion followed by KOL analysis
#[derive(Clone)]
pub struct KolBranch {
    ingestion: IngestionStage,
    agent: AnalystAgent,
}

impl KolBranch {
    pub fn new(ingestion: IngestionStage, agent: AnalystAgent) -> Self {
        Self { ingestion, agent }
    }

    /// Ingestion always completes before the analysis starts
    pub async fn run(&self) -> KolBranchOutput {
        let ingested = self.ingestion.ingest().await;
        info!("KOL data:\n{}", ingested.display.render());

        let prompt = kol_prompt(self.ingestion.request().hours(), &ingested.raw);
        let analysis = self.agent.analyze(&prompt).await;

        KolBranchOutput {
            raw: ingested.raw,
            analysis,
        }
    }
}

/// Branch B: on-chain market analysis
#[derive(Clone)]
pub struct MarketBranch {
    agent: AnalystAgent,
}

impl MarketBranch {
    pub fn new(agent: AnalystAgent) -> Self {
        Self { agent }
    }

    pub async fn run(&self) -> AnalysisOutcome {
        self.agent.analyze(&market_prompt()).await
    }
}

pub fn kol_prompt(hours: u32, feed: &KolFeed) -> String {
    format!(
        "Analyse the market trend based on what KOLs published over the last {hours} hours.\n\
         Provide a detailed analysis of the KOL data.\n\
         \n\
         Raw data:\n\
         {feed}\n",
        hours = hours,
        feed = feed.render(),
    )
}

pub fn market_prompt() -> String {
    "Analyse the current on-chain data, focusing on:\n\
     1. Abnormal trading volume\n\
     2. Whale activity\n\
     3. DEX liquidity changes\n\
     4. Gas fee trends\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::llm::ScriptedProvider;
    use common::KOL_DATA_UNAVAILABLE;
    use data_ingestion::{FetchRequest, StaticKolSource};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_kol_prompt_embeds_window_and_payload() {
        let prompt = kol_prompt(4, &KolFeed::Posts(json!({"posts": ["wagmi"]})));
        assert!(prompt.contains("last 4 hours"));
        assert!(prompt.contains("wagmi"));
    }

    #[test]
    fn test_market_prompt_lists_focus_areas() {
        let prompt = market_prompt();
        for focus in ["volume", "Whale", "DEX liquidity", "Gas fee"] {
            assert!(prompt.contains(focus), "missing {}", focus);
        }
    }

    #[tokio::test]
    async fn test_kol_branch_analyses_placeholder_when_fetch_fails() {
        let provider = Arc::new(ScriptedProvider::replying("no signal"));
        let branch = KolBranch::new(
            IngestionStage::new(Arc::new(StaticKolSource::timeout()), FetchRequest::default()),
            AnalystAgent::new(AgentConfig::kol_monitor(), provider.clone()).unwrap(),
        );

        let output = branch.run().await;
        assert_eq!(output.raw, KolFeed::Unavailable);
        assert_eq!(output.analysis, AnalysisOutcome::Completed("no signal".into()));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user_content().unwrap().contains(KOL_DATA_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_market_branch_runs_without_ingestion() {
        let provider = Arc::new(ScriptedProvider::replying("high volume"));
        let branch = MarketBranch::new(
            AnalystAgent::new(AgentConfig::market_data_analyst(), provider.clone()).unwrap(),
        );

        assert_eq!(branch.run().await, AnalysisOutcome::Completed("high volume".into()));
        assert!(provider.requests()[0].user_content().unwrap().contains("Whale activity"));
    }
}
