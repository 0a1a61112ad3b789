//! Value objects passed between pipeline stages

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker substituted for the KOL payload when the feed could not be fetched
pub const KOL_DATA_UNAVAILABLE: &str = "KOL raw data unavailable";

/// Result of one Bounded Fetch call
pub type FetchResult = Result<serde_json::Value, FetchError>;

/// KOL payload as seen by downstream stages
///
/// A failed fetch never reaches the analysts as an error. It is downgraded to
/// `Unavailable`, which renders as [`KOL_DATA_UNAVAILABLE`] in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum KolFeed {
    Posts(serde_json::Value),
    Unavailable,
}

impl KolFeed {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, KolFeed::Unavailable)
    }

    pub fn posts(&self) -> Option<&serde_json::Value> {
        match self {
            KolFeed::Posts(value) => Some(value),
            KolFeed::Unavailable => None,
        }
    }

    /// Text form used inside prompts and reports
    pub fn render(&self) -> String {
        match self {
            KolFeed::Posts(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            KolFeed::Unavailable => KOL_DATA_UNAVAILABLE.to_string(),
        }
    }
}

impl fmt::Display for KolFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Identity of a concurrently running analysis branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchId {
    Kol,
    Market,
}

impl BranchId {
    pub fn slot(&self) -> &'static str {
        match self {
            BranchId::Kol => "kol_analysis",
            BranchId::Market => "market_analysis",
        }
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot())
    }
}

/// Settled outcome of one analysis branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed(String),
    Failed(String),
}

impl AnalysisOutcome {
    pub fn from_result<E: fmt::Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => AnalysisOutcome::Completed(text),
            Err(e) => AnalysisOutcome::Failed(e.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Completed(text) => Some(text),
            AnalysisOutcome::Failed(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Completed(_) => None,
            AnalysisOutcome::Failed(reason) => Some(reason),
        }
    }

    /// Text form embedded in the strategy prompt. Failure reasons are kept verbatim.
    pub fn render(&self) -> String {
        match self {
            AnalysisOutcome::Completed(text) => text.clone(),
            AnalysisOutcome::Failed(reason) => format!("[analysis failed: {}]", reason),
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Both branches after the barrier
///
/// Only built once both branches have settled, so neither slot is ever empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedResult {
    pub kol_raw: KolFeed,
    pub kol_analysis: AnalysisOutcome,
    pub market_analysis: AnalysisOutcome,
}

impl JoinedResult {
    pub fn new(
        kol_raw: KolFeed,
        kol_analysis: AnalysisOutcome,
        market_analysis: AnalysisOutcome,
    ) -> Self {
        Self {
            kol_raw,
            kol_analysis,
            market_analysis,
        }
    }

    pub fn analysis(&self, branch: BranchId) -> &AnalysisOutcome {
        match branch {
            BranchId::Kol => &self.kol_analysis,
            BranchId::Market => &self.market_analysis,
        }
    }

    /// Branches whose slot carries a failure
    pub fn failed_branches(&self) -> Vec<BranchId> {
        [BranchId::Kol, BranchId::Market]
            .into_iter()
            .filter(|branch| !self.analysis(*branch).is_completed())
            .collect()
    }
}

/// Terminal value of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SynthesisResult {
    Strategy { text: String },
    Error { error: String },
}

impl SynthesisResult {
    pub fn strategy(text: impl Into<String>) -> Self {
        SynthesisResult::Strategy { text: text.into() }
    }

    pub fn error(error: impl fmt::Display) -> Self {
        SynthesisResult::Error {
            error: error.to_string(),
        }
    }

    pub fn is_strategy(&self) -> bool {
        matches!(self, SynthesisResult::Strategy { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SynthesisResult::Strategy { text } => Some(text),
            SynthesisResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SynthesisResult::Strategy { .. } => None,
            SynthesisResult::Error { error } => Some(error),
        }
    }
}
