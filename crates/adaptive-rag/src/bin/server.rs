//! Adaptive RAG server binary
//!
//! Run with: cargo run -p adaptive-rag --bin adaptive-rag-server
//! Set ADAPTIVE_RAG_CONFIG to a TOML file to override the defaults.

use adaptive_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adaptive_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                    Adaptive RAG System                    ║
║        Routed retrieval with self-checked answers         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::var("ADAPTIVE_RAG_CONFIG").ok().map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Router: {:?}", config.router.mode);
    tracing::info!("  - Web search: {:?}", config.web_search.backend);
    tracing::info!("  - Max loops: {}", config.graph.max_loops);
    tracing::info!("  - Max regenerate retries: {}", config.graph.max_regenerate_retries);
    tracing::info!("  - Per-call timeout: {}s", config.graph.per_call_timeout_secs);

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let client = reqwest::Client::new();
    match client.get(format!("{}/api/tags", config.llm.base_url)).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Please start Ollama:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!("  2. Pull the model: ollama pull {}", config.llm.model);
        }
    }

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/query - Ask a question");
    println!("  GET  /api/graph - Show the decision graph");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
