use anyhow::Result;
use common::PipelineConfig;
use data_ingestion::{FetchRequest, KolConnector};
use tracing::{error, info, Level};
use tracing_subscriber::fmt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt().with_max_level(Level::INFO).init();

    let config = PipelineConfig::load()?;
    let connector = KolConnector::from_settings(&config.kol);
    let timeout = config.kol.timeout_secs;

    info!("Probing KOL feed at {}", connector.api_url());

    // Defaults, a wider window, and out-of-range values that get clamped to 1h / 1000
    let probes = [
        ("default", FetchRequest::new(config.kol.hours, config.kol.limit, timeout)),
        ("custom", FetchRequest::new(24, 500, timeout)),
        ("clamped", FetchRequest::new(-5, 1500, timeout)),
    ];

    for (label, request) in probes {
        println!(
            "\n[{}] hours={} limit={}",
            label,
            request.hours(),
            request.limit()
        );
        match connector.fetch_kol_posts(request).await {
            Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
            Err(e) => {
                error!("KOL fetch failed: {}", e);
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            }
        }
    }

    Ok(())
}
