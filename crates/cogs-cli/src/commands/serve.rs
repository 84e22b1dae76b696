//! Server command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use cogs_core::{AgentConfig, Dataset, PromptLibrary};

pub async fn cmd_serve(
    dataset: Arc<Dataset>,
    config: AgentConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting COGS report server...");
    println!("   Dataset: {}", config.data_dir.display());
    println!(
        "   Rows: {} line items, {} days",
        dataset.line_items.len(),
        dataset.daily.len()
    );
    println!("   Listening: http://{}:{}", host, port);
    println!("   Remote agent: {} at {}", config.model, config.base_url);
    if config.api_key.is_empty() {
        println!("   ⚠️  OPENAI_API_KEY not set (openai mode sends an empty key)");
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let mut prompts = PromptLibrary::new();
    let state = cogs_server::AppState::new(dataset, config, &mut prompts)
        .context("Failed to load report prompt")?;

    let server_config = cogs_server::ServerConfig { allowed_origins };
    cogs_server::serve_with_config(state, host, port, server_config).await?;

    Ok(())
}
