use anyhow::Result;
use clap::Parser;
use common::PipelineConfig;
use signal_generation::{Cli, TradingPipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Branches are multiplexed on a single thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let command = Cli::parse().command();
    let config = PipelineConfig::load()?;
    if command.write_config(&config)? {
        return Ok(());
    }

    info!("🚀 Starting trading decision pipeline");
    if !config.llm.active().has_api_key() {
        warn!(
            "No API key configured for {}, every analysis will fail",
            config.llm.provider
        );
    }

    let pipeline = TradingPipeline::from_config(&config)?;
    let report = pipeline.run_with_report().await;

    println!("\n{}", report);
    info!("👋 Program finished");

    Ok(())
}
