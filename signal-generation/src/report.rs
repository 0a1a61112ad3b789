// Human-readable summary of a pipeline run

use super::pipeline::PipelineState;
use chrono::{DateTime, Utc};
use common::{JoinedResult, SynthesisResult};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Everything a run produced, for printing
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: PipelineState,
    /// Absent when the join itself failed
    pub joined: Option<JoinedResult>,
    pub result: SynthesisResult,
}

impl PipelineReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Execution Result ===")?;

        if let Some(joined) = &self.joined {
            let kol_data = if joined.kol_raw.is_unavailable() {
                "unavailable"
            } else {
                "fetched"
            };
            writeln!(f, "KOL data: {}", kol_data)?;
            writeln!(f, "KOL analysis: {}", joined.kol_analysis)?;
            writeln!(f)?;
            writeln!(f, "Market analysis: {}", joined.market_analysis)?;
            writeln!(f)?;
        }

        match &self.result {
            SynthesisResult::Strategy { text } => {
                writeln!(f, "Trading strategy: {}", text)?;
                writeln!(f)?;
                write!(f, "=== Pipeline complete ({} ms) ===", self.duration_ms())
            }
            SynthesisResult::Error { error } => write!(f, "Execution error: {}", error),
        }
    }
}
