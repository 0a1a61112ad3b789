// Signal Generation (Layer 2)
// Turns the joined research outputs into a trading strategy and drives a full
// pipeline run

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod strategy;

pub use cli::{Cli, Command};
pub use pipeline::{PipelineState, TradingPipeline};
pub use report::PipelineReport;
pub use strategy::{strategy_prompt, StrategyMaker};
