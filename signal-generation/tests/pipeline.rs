//! End-to-end pipeline runs against canned providers and a static KOL feed

use async_trait::async_trait;
use common::{
    AnalysisOutcome, JoinedResult, KolFeed, PipelineError, SynthesisResult, KOL_DATA_UNAVAILABLE,
};
use data_ingestion::{FetchRequest, IngestionStage, StaticKolSource};
use research_agents::{
    AgentConfig, AnalystAgent, KolBranch, MarketBranch, Orchestration, Orchestrator,
    ScriptedProvider,
};
use serde_json::json;
use signal_generation::{PipelineState, StrategyMaker, TradingPipeline};
use std::sync::Arc;
use std::time::Duration;

struct Providers {
    kol: Arc<ScriptedProvider>,
    market: Arc<ScriptedProvider>,
    strategy: Arc<ScriptedProvider>,
}

fn pipeline(
    source: StaticKolSource,
    kol: ScriptedProvider,
    market: ScriptedProvider,
    strategy: ScriptedProvider,
) -> (TradingPipeline, Providers) {
    let providers = Providers {
        kol: Arc::new(kol),
        market: Arc::new(market),
        strategy: Arc::new(strategy),
    };

    let orchestrator = Orchestrator::new(
        KolBranch::new(
            IngestionStage::new(Arc::new(source), FetchRequest::new(4, 100, 15)),
            AnalystAgent::new(AgentConfig::kol_monitor(), providers.kol.clone()).unwrap(),
        ),
        MarketBranch::new(
            AnalystAgent::new(AgentConfig::market_data_analyst(), providers.market.clone())
                .unwrap(),
        ),
    );
    let strategy = StrategyMaker::from_provider(providers.strategy.clone()).unwrap();

    (TradingPipeline::new(Box::new(orchestrator), strategy), providers)
}

fn strategy_prompt_seen(providers: &Providers) -> String {
    let requests = providers.strategy.requests();
    assert_eq!(requests.len(), 1, "synthesis must be invoked exactly once");
    requests[0].user_content().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_happy_path_produces_strategy() {
    let (pipeline, providers) = pipeline(
        StaticKolSource::posts(json!({"posts": [{"author": "trader", "text": "ETH breakout"}]})),
        ScriptedProvider::replying("bullish"),
        ScriptedProvider::replying("high volume"),
        ScriptedProvider::replying("Buy ETH on the retest, stop below the range"),
    );

    let result = pipeline.run().await;

    assert!(result.text().is_some_and(|text| !text.is_empty()));
    assert_eq!(pipeline.state().await, PipelineState::Done);

    let prompt = strategy_prompt_seen(&providers);
    assert!(prompt.contains("bullish"));
    assert!(prompt.contains("high volume"));
    assert!(prompt.contains("ETH breakout"));
}

#[tokio::test]
async fn test_fetch_timeout_degrades_to_placeholder() {
    let (pipeline, providers) = pipeline(
        StaticKolSource::timeout(),
        ScriptedProvider::replying("nothing to analyse"),
        ScriptedProvider::replying("high volume"),
        ScriptedProvider::replying("Stay flat"),
    );

    let report = pipeline.run_with_report().await;

    // Branch A still ran, over the placeholder
    let kol_requests = providers.kol.requests();
    assert_eq!(kol_requests.len(), 1);
    assert!(kol_requests[0].user_content().unwrap().contains(KOL_DATA_UNAVAILABLE));

    let joined = report.joined.expect("join completed");
    assert_eq!(joined.kol_raw, KolFeed::Unavailable);
    assert_eq!(joined.kol_analysis.text(), Some("nothing to analyse"));
    assert!(!joined.kol_raw.render().contains("timed out"));
    assert_eq!(report.result, SynthesisResult::strategy("Stay flat"));
}

#[tokio::test]
async fn test_both_branches_fail_synthesis_still_runs() {
    let (pipeline, providers) = pipeline(
        StaticKolSource::posts(json!({"posts": []})),
        ScriptedProvider::failing("api error 500 Internal Server Error: kol model down"),
        ScriptedProvider::failing("request timed out"),
        ScriptedProvider::replying("Insufficient data, no trade"),
    );

    let report = pipeline.run_with_report().await;

    let joined = report.joined.expect("join completed");
    assert_eq!(
        joined.kol_analysis,
        AnalysisOutcome::Failed("api error 500 Internal Server Error: kol model down".into())
    );
    assert_eq!(joined.market_analysis, AnalysisOutcome::Failed("request timed out".into()));

    let prompt = strategy_prompt_seen(&providers);
    assert!(prompt.contains("api error 500 Internal Server Error: kol model down"));
    assert!(prompt.contains("request timed out"));

    assert_eq!(report.result.text(), Some("Insufficient data, no trade"));
    assert_eq!(report.state, PipelineState::Done);
}

#[tokio::test]
async fn test_synthesis_failure_is_terminal_error() {
    let (pipeline, providers) = pipeline(
        StaticKolSource::posts(json!({"posts": []})),
        ScriptedProvider::failing("kol down"),
        ScriptedProvider::failing("market down"),
        ScriptedProvider::failing("strategy model down"),
    );

    let result = pipeline.run().await;

    assert_eq!(result.error_message(), Some("synthesis failed: strategy model down"));
    assert_eq!(pipeline.state().await, PipelineState::Failed);
    assert_eq!(providers.strategy.requests().len(), 1);
}

#[tokio::test]
async fn test_panicking_strategy_maker_ends_as_error() {
    let (pipeline, _providers) = pipeline(
        StaticKolSource::posts(json!({"posts": []})),
        ScriptedProvider::replying("bullish"),
        ScriptedProvider::replying("high volume"),
        ScriptedProvider::panicking("boom"),
    );

    let report = pipeline.run_with_report().await;

    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(
        report.result.error_message(),
        Some("synthesis failed: strategy maker panicked: boom")
    );
    let joined = report.joined.expect("join completed");
    assert_eq!(joined.kol_analysis.text(), Some("bullish"));
    assert_eq!(pipeline.state().await, PipelineState::Failed);
}

#[tokio::test]
async fn test_slow_branch_is_awaited_before_synthesis() {
    let (pipeline, providers) = pipeline(
        StaticKolSource::posts(json!({"posts": []})).with_delay(Duration::from_millis(100)),
        ScriptedProvider::replying("bullish").with_delay(Duration::from_millis(200)),
        ScriptedProvider::replying("high volume"),
        ScriptedProvider::replying("Buy"),
    );

    let report = pipeline.run_with_report().await;

    assert!(report.duration_ms() >= 300);
    let prompt = strategy_prompt_seen(&providers);
    assert!(prompt.contains("bullish"));
    assert!(prompt.contains("high volume"));
}

struct BrokenJoin;

#[async_trait]
impl Orchestration for BrokenJoin {
    async fn orchestrate(&self) -> Result<JoinedResult, PipelineError> {
        Err(PipelineError::JoinFailure("kol_analysis branch: task was cancelled".into()))
    }
}

#[tokio::test]
async fn test_join_failure_skips_synthesis() {
    let strategy_provider = Arc::new(ScriptedProvider::replying("should never be asked"));
    let pipeline = TradingPipeline::new(
        Box::new(BrokenJoin),
        StrategyMaker::from_provider(strategy_provider.clone()).unwrap(),
    );

    let report = pipeline.run_with_report().await;

    assert!(report.joined.is_none());
    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(
        report.result.error_message(),
        Some("join failure: kol_analysis branch: task was cancelled")
    );
    assert!(strategy_provider.requests().is_empty());
    assert_eq!(pipeline.state().await, PipelineState::Failed);
}
