// Main entry point - Dependency injection and loader startup
use std::sync::Arc;

use container_loader::application::loader::{Collaborators, Loader};
use container_loader::domain::region::RegionId;
use container_loader::domain::request::LoadOptions;
use container_loader::infrastructure::config::load_loader_config;
use container_loader::infrastructure::http_transport::HttpTransport;
use container_loader::infrastructure::memory_document::MemoryDocument;
use container_loader::infrastructure::system::{SystemClock, TracingEvents, TracingHistory, TracingUi};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_loader_config()?;

    // Create adapters (infrastructure layer)
    let document = Arc::new(MemoryDocument::new(&config.page.layout));
    let collaborators = Collaborators {
        transport: Arc::new(HttpTransport::new(config.loader.base_url.clone())?),
        document: document.clone(),
        ui: Arc::new(TracingUi::default()),
        history: Arc::new(TracingHistory),
        events: Arc::new(TracingEvents),
        clock: Arc::new(SystemClock),
    };

    // Create the loader (application layer)
    let mut loader = Loader::new(config.loader.clone(), collaborators)?;
    loader.initialize();

    if let Some(start_url) = &config.page.start_url {
        let container = RegionId::from(config.page.start_container.as_str());
        tracing::info!("Loading {} into {}", loader.url(Some(start_url.as_str())), container);
        loader.load(start_url, Some(&container), LoadOptions::default());
    }

    tracing::info!("Container loader running, press Ctrl-C to stop");
    loader
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await;

    tracing::debug!("Final page: {}", document.html());
    Ok(())
}
