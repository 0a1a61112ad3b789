use anyhow::Result;
use common::{PipelineConfig, ProviderKind};
use research_agents::{build_provider_of, ChatMessage, ChatRequest};
use tracing::{error, Level};
use tracing_subscriber::fmt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt().with_max_level(Level::WARN).init();

    let config = PipelineConfig::load()?;
    let kinds = [ProviderKind::OpenAi, ProviderKind::DeepSeek];

    println!("[API Key Check]");
    for kind in kinds {
        let present = config.llm.provider_settings(kind).has_api_key();
        println!("{} API key: {}", kind, if present { "Exists" } else { "Not found" });
    }
    println!();

    for kind in kinds {
        if !config.llm.provider_settings(kind).has_api_key() {
            println!("Skipping {} test: API key not found\n", kind);
            continue;
        }

        let provider = build_provider_of(kind, &config.llm)?;
        let request = ChatRequest::single_turn(vec![
            ChatMessage::system("You are a helpful assistant"),
            ChatMessage::user("Hello"),
        ]);

        match provider.complete(request).await {
            Ok(text) => println!("[{} Test Result ({})]\n{}\n", kind, provider.model(), text),
            Err(e) => {
                error!("{} test failed: {}", kind, e);
                println!("{} test failed: {}\n", kind, e);
            }
        }
    }

    Ok(())
}
