//! Agency Strategist - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the strategy API.

use agency_strategist::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agency_strategist=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, max_round={}, speaker_selection={:?}",
        config.llm.model, config.conversation.max_round, config.conversation.speaker_selection
    );
    if config.search.api_key.is_none() {
        tracing::warn!("SERPER_API_KEY is not set; research calls will return errors");
    }

    api::serve(config).await?;

    Ok(())
}
