//! Orchestrator - fans out the KOL and market branches and joins them
//!
//! Both branches are launched as independent tasks and the orchestrator
//! suspends until *both* have settled. A branch that fails (or panics) ends
//! up as `Failed(reason)` in its own slot; the sibling is never cancelled.
//! Only a join that cannot complete at all is reported as
//! [`PipelineError::JoinFailure`].

use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{error, info, info_span, Instrument};

use crate::agent::{AgentConfig, AnalystAgent};
use crate::branches::{KolBranch, KolBranchOutput, MarketBranch};
use crate::llm::ChatProvider;
use common::{AnalysisOutcome, BranchId, JoinedResult, KolFeed, PipelineError};
use data_ingestion::{FetchRequest, IngestionStage, KolSource};

/// Anything that produces a [`JoinedResult`]
#[async_trait]
pub trait Orchestration: Send + Sync {
    async fn orchestrate(&self) -> Result<JoinedResult, PipelineError>;
}

/// Orchestrator - coordinates the two analysis branches
pub struct Orchestrator {
    kol: Arc<KolBranch>,
    market: Arc<MarketBranch>,
}

impl Orchestrator {
    pub fn new(kol: KolBranch, market: MarketBranch) -> Self {
        Self {
            kol: Arc::new(kol),
            market: Arc::new(market),
        }
    }

    /// Wire both branches from a KOL source and one provider
    pub fn from_parts(
        source: Arc<dyn KolSource>,
        request: FetchRequest,
        provider: Arc<dyn ChatProvider>,
        max_turns: u32,
    ) -> Result<Self> {
        let kol = KolBranch::new(
            IngestionStage::new(source, request),
            AnalystAgent::new(
                AgentConfig::kol_monitor().with_max_turns(max_turns),
                Arc::clone(&provider),
            )?,
        );
        let market = MarketBranch::new(AnalystAgent::new(
            AgentConfig::market_data_analyst().with_max_turns(max_turns),
            provider,
        )?);
        Ok(Self::new(kol, market))
    }

    pub async fn orchestrate(&self) -> Result<JoinedResult, PipelineError> {
        let started = Instant::now();
        info!("Launching KOL and market branches");

        let kol = Arc::clone(&self.kol);
        let kol_task = tokio::spawn(
            async move { kol.run().await }.instrument(info_span!("branch", branch = %BranchId::Kol)),
        );

        let market = Arc::clone(&self.market);
        let market_task = tokio::spawn(
            async move { market.run().await }
                .instrument(info_span!("branch", branch = %BranchId::Market)),
        );

        // Barrier: wait for both, whatever order they finish in
        let (kol_settled, market_settled) = tokio::join!(kol_task, market_task);

        let kol_output = match settle(BranchId::Kol, kol_settled)? {
            Ok(output) => output,
            Err(reason) => KolBranchOutput {
                raw: KolFeed::Unavailable,
                analysis: AnalysisOutcome::Failed(reason),
            },
        };
        let market_analysis = match settle(BranchId::Market, market_settled)? {
            Ok(analysis) => analysis,
            Err(reason) => AnalysisOutcome::Failed(reason),
        };

        let joined = JoinedResult::new(kol_output.raw, kol_output.analysis, market_analysis);
        info!(
            "KOL and market branches settled in {}ms ({} failed)",
            started.elapsed().as_millis(),
            joined.failed_branches().len()
        );
        Ok(joined)
    }
}

#[async_trait]
impl Orchestration for Orchestrator {
    async fn orchestrate(&self) -> Result<JoinedResult, PipelineError> {
        Orchestrator::orchestrate(self).await
    }
}

/// Turn a finished task into either its value or a branch-level failure.
///
/// A panic stays inside the branch slot; a task that was cancelled by the
/// runtime means the join itself failed.
fn settle<T>(
    branch: BranchId,
    joined: Result<T, JoinError>,
) -> Result<Result<T, String>, PipelineError> {
    match joined {
        Ok(value) => Ok(Ok(value)),
        Err(e) if e.is_panic() => {
            let reason = format!("{} branch panicked: {}", branch, panic_message(e.into_panic()));
            error!("{}", reason);
            Ok(Err(reason))
        }
        Err(e) => {
            error!("{} branch could not be joined: {}", branch, e);
            Err(PipelineError::JoinFailure(format!("{} branch: {}", branch, e)))
        }
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
