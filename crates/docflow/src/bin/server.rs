//! Document server binary
//!
//! Run with: cargo run -p docflow --bin docflow-server

use docflow::{config::DocflowConfig, server::DocflowServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional TOML config; defaults otherwise
    let config = match std::env::var("DOCFLOW_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            DocflowConfig::load(&path)?
        }
        Err(_) => DocflowConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Max prompt chars: {}", config.analysis.max_prompt_chars);
    tracing::info!("  - Data dir: {}", config.storage.data_dir.display());

    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.llm.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Analysis jobs will fail until it is reachable (ollama serve)");
        }
    }

    let server = DocflowServer::new(config).await?;

    println!("Server starting...");
    println!("  API:    http://{}/api", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/documents             - Upload a PDF or DOCX document");
    println!("  POST /api/documents/:id/analyze - Queue analysis (force=true to re-run)");
    println!("  GET  /api/documents/:id         - Get document details");
    println!("  GET  /api/jobs/:id              - Get job status");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
