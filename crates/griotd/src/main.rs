//! Griot daemon entry point.
//!
//! Answers a single query passed on the command line, or runs a small
//! read-eval loop on stdin.

use anyhow::Result;
use griotd::config::Config;
use griotd::enrichment::WikipediaClient;
use griotd::llm::{CloudGenerationClient, GenerationClient};
use griotd::orchestrator::Engine;
use serde_json::Map;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("griotd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let generation: Option<Arc<dyn GenerationClient>> =
        match CloudGenerationClient::from_config(&config.generation) {
            Ok(client) if client.is_configured() => Some(Arc::new(client)),
            Ok(_) => {
                warn!("No generation API key set; using deterministic fallbacks");
                None
            }
            Err(e) => {
                warn!("Generation client unavailable: {}", e);
                None
            }
        };
    let enrichment = Arc::new(WikipediaClient::from_config(&config.enrichment)?);

    let items = match &config.engine.dataset_path {
        Some(path) => griot_common::dataset::load_path(path).unwrap_or_else(|e| {
            warn!("Falling back to builtin dataset: {:#}", e);
            griot_common::dataset::builtin()
        }),
        None => griot_common::dataset::builtin(),
    };

    let engine = Engine::with_dataset(&config, items, generation, enrichment);
    info!("Engine ready");

    if let Some(query) = std::env::args().nth(1) {
        let response = engine.answer(&query, Map::new()).await;
        print_response(&response);
        return Ok(());
    }

    repl(&engine).await
}

async fn repl(engine: &Engine) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"griot> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "quit" || query == "exit" {
            break;
        }
        let response = engine.answer(query, Map::new()).await;
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &griot_common::AgentResponse) {
    println!("{}", response.text);
    println!();
    println!("confidence: {:.2}", response.confidence);
    if !response.sources.is_empty() {
        let names: Vec<&str> = response.sources.iter().map(|s| s.name.as_str()).collect();
        println!("sources: {}", names.join(", "));
    }
}
