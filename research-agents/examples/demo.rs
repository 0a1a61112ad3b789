//! Offline walk-through of the fan-out/fan-in orchestrator
//!
//! This example demonstrates:
//! 1. Wiring both branches with canned providers and a static KOL feed
//! 2. A slow market branch that the join waits for
//! 3. A failing KOL analysis that lands in its own slot

use anyhow::Result;
use data_ingestion::{FetchRequest, IngestionStage, StaticKolSource};
use research_agents::{
    AgentConfig, AnalystAgent, KolBranch, MarketBranch, Orchestrator, ScriptedProvider,
};
use serde_json::json;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::fmt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    fmt().with_max_level(Level::INFO).init();

    info!("🤖 Research Agents - fan-out/fan-in demo");
    info!("========================================");

    let feed = json!({
        "posts": [
            {"author": "@onchainwizard", "text": "ETH/BTC reclaiming the weekly range"},
            {"author": "@degenalpha", "text": "Rotating into L2 tokens, volume picking up"}
        ]
    });

    // Step 1: both branches succeed, market branch is the slow one
    let orchestrator = build(
        StaticKolSource::posts(feed.clone()),
        ScriptedProvider::replying("KOL sentiment is bullish on ETH and L2s."),
        ScriptedProvider::replying("DEX volume up 40%, whales accumulating.")
            .with_delay(Duration::from_millis(500)),
    )?;
    let joined = orchestrator.orchestrate().await?;
    info!("✅ Joined result:\n{}", serde_json::to_string_pretty(&joined)?);

    // Step 2: the KOL analysis fails, the market branch still completes
    let orchestrator = build(
        StaticKolSource::posts(feed),
        ScriptedProvider::failing("api error 503 Service Unavailable: overloaded"),
        ScriptedProvider::replying("Gas fees trending down."),
    )?;
    let joined = orchestrator.orchestrate().await?;
    info!("⚠️ Failed branches: {:?}", joined.failed_branches());
    info!("Joined result:\n{}", serde_json::to_string_pretty(&joined)?);

    // Step 3: the KOL feed itself is down
    let orchestrator = build(
        StaticKolSource::timeout(),
        ScriptedProvider::replying("No KOL data available, no signal."),
        ScriptedProvider::replying("Liquidity stable."),
    )?;
    let joined = orchestrator.orchestrate().await?;
    info!("KOL raw data: {}", joined.kol_raw);

    Ok(())
}

fn build(
    source: StaticKolSource,
    kol_provider: ScriptedProvider,
    market_provider: ScriptedProvider,
) -> Result<Orchestrator> {
    let kol = KolBranch::new(
        IngestionStage::new(Arc::new(source), FetchRequest::default()),
        AnalystAgent::new(AgentConfig::kol_monitor(), Arc::new(kol_provider))?,
    );
    let market = MarketBranch::new(AnalystAgent::new(
        AgentConfig::market_data_analyst(),
        Arc::new(market_provider),
    )?);
    Ok(Orchestrator::new(kol, market))
}
