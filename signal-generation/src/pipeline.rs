// Trading Pipeline Driver
// Sequences the orchestrator (KOL + market branches) and the strategy synthesis

use super::report::PipelineReport;
use super::strategy::StrategyMaker;
use anyhow::Result;
use chrono::Utc;
use common::{JoinedResult, LlmError, PipelineConfig, PipelineError, SynthesisResult};
use data_ingestion::{FetchRequest, KolConnector};
use research_agents::{build_provider, panic_message, Orchestration, Orchestrator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    IngestingAndAnalyzing,
    Joined,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Trading decision pipeline
pub struct TradingPipeline {
    orchestrator: Box<dyn Orchestration>,
    strategy: StrategyMaker,
    state: Arc<RwLock<PipelineState>>,
}

impl TradingPipeline {
    /// Create a pipeline from its two stages
    pub fn new(orchestrator: Box<dyn Orchestration>, strategy: StrategyMaker) -> Self {
        Self {
            orchestrator,
            strategy,
            state: Arc::new(RwLock::new(PipelineState::Idle)),
        }
    }

    /// Wire the live KOL connector and the configured LLM provider
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let provider = build_provider(&config.llm)?;
        info!(
            "Using {} ({}) for all agents",
            provider.name(),
            provider.model()
        );

        let orchestrator = Orchestrator::from_parts(
            Arc::new(KolConnector::from_settings(&config.kol)),
            FetchRequest::from(&config.kol),
            Arc::clone(&provider),
            config.llm.max_turns,
        )?;
        let strategy = StrategyMaker::with_max_turns(provider, config.llm.max_turns)?;

        Ok(Self::new(Box::new(orchestrator), strategy))
    }

    /// Current state
    pub async fn state(&self) -> PipelineState {
        *self.state.read().await
    }

    async fn transition(&self, next: PipelineState) {
        let mut state = self.state.write().await;
        debug!("Pipeline state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Run once and return the terminal result
    pub async fn run(&self) -> SynthesisResult {
        self.run_with_report().await.result
    }

    /// Run once, keeping the joined inputs for display
    pub async fn run_with_report(&self) -> PipelineReport {
        let run_id = Uuid::new_v4();
        self.execute(run_id)
            .instrument(info_span!("pipeline", run_id = %run_id))
            .await
    }

    async fn execute(&self, run_id: Uuid) -> PipelineReport {
        let started_at = Utc::now();
        info!("Starting trading decision pipeline");

        self.transition(PipelineState::IngestingAndAnalyzing).await;
        info!("Waiting for KOL analysis and market analysis to complete...");

        let joined = match self.orchestrator.orchestrate().await {
            Ok(joined) => joined,
            Err(e) => {
                error!("Pipeline failed before synthesis: {}", e);
                self.transition(PipelineState::Failed).await;
                return PipelineReport {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    state: PipelineState::Failed,
                    joined: None,
                    result: SynthesisResult::error(e),
                };
            }
        };
        self.transition(PipelineState::Joined).await;
        info!("KOL analysis and market analysis completed");

        self.transition(PipelineState::Synthesizing).await;
        let (state, result) = match self.synthesize(joined.clone()).await {
            Ok(text) => (PipelineState::Done, SynthesisResult::strategy(text)),
            Err(e) => {
                error!("Strategy synthesis failed: {}", e);
                (PipelineState::Failed, SynthesisResult::error(e))
            }
        };
        self.transition(state).await;
        info!("Pipeline finished in state {:?}", state);

        PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            state,
            joined: Some(joined),
            result,
        }
    }

    /// Synthesis runs in its own task so a panicking provider ends the run as
    /// an error instead of unwinding out of it
    async fn synthesize(&self, joined: JoinedResult) -> Result<String, PipelineError> {
        let strategy = self.strategy.clone();
        let task = tokio::spawn(
            async move { strategy.try_synthesize(joined).await }
                .instrument(info_span!("synthesis")),
        );

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(PipelineError::Synthesis(LlmError::Other(format!(
                "strategy maker panicked: {}",
                panic_message(e.into_panic())
            )))),
            Err(e) => Err(PipelineError::JoinFailure(format!("synthesis: {}", e))),
        }
    }
}
