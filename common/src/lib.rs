//! Shared types for the KOL / on-chain trading pipeline
//!
//! Every crate in the workspace passes these value types forward between
//! stages. None of them is mutated after construction.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    create_config_template, load_config, save_config, KolFeedSettings, LlmSettings,
    PipelineConfig, ProviderKind, ProviderSettings,
};
pub use error::{FetchError, LlmError, PipelineError};
pub use types::{
    AnalysisOutcome, BranchId, FetchResult, JoinedResult, KolFeed, SynthesisResult,
    KOL_DATA_UNAVAILABLE,
};
