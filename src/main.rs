mod analyzer;
mod api;
mod cache;
mod config;
mod extract;
mod orchestrator;
mod server;
#[cfg(test)]
mod testing;

use crate::analyzer::{PromptTemplate, RetryingAnalyzer};
use crate::api::{HttpFetcher, OpenAiClient};
use crate::cache::{FileArtifactStore, InMemoryCacheStore};
use crate::config::Config;
use crate::extract::ContentExtractor;
use crate::orchestrator::Orchestrator;
use crate::server::{AppState, ComplianceResponse};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Overrides COMPLIANCE_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze one policy/webpage pair and print the response
    Analyze {
        #[arg(long)]
        policy: String,
        #[arg(long, alias = "target")]
        webpage: String,
    },
}

fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    if config.openai_api_key.is_empty() {
        warn!("COMPLIANCE_OPENAI_API_KEY is not set; completion requests will be rejected");
    }
    let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to build document fetcher")?;
    let completion = OpenAiClient::with_timeout(
        Duration::from_secs(config.openai_timeout_secs),
        &config.openai_base_url,
        &config.openai_api_key,
        &config.openai_model,
    )
    .context("Failed to build completion client")?;

    let analyzer = RetryingAnalyzer::new(
        Arc::new(completion),
        PromptTemplate::new(&config.prompt),
        config.openai_tokens,
    )
    .with_retry_policy(config.retry_policy())
    .with_granularity(config.finding_granularity);

    Ok(Orchestrator::new(
        Arc::new(fetcher),
        analyzer,
        Arc::new(InMemoryCacheStore::new(config.cache_max_age())),
        Arc::new(FileArtifactStore::new(Some(config.asset_directory.clone()))),
    )
    .with_extractor(ContentExtractor::new(&config.heading_tags))
    .with_request_timeout(config.request_timeout()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to read configuration")?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let orchestrator = build_orchestrator(&config)?;
            info!(
                "Starting compliance service (model={}, tokens={})",
                config.openai_model, config.openai_tokens
            );
            server::serve(
                &config.listen_addr(),
                AppState {
                    orchestrator: Arc::new(orchestrator),
                },
            )
            .await
            .context("HTTP server failed")?;
        }
        Commands::Analyze { policy, webpage } => {
            let orchestrator = build_orchestrator(&config)?;
            let outcome = orchestrator.handle_request(&policy, &webpage).await?;
            info!("Analyzed {} (cache_hit={})", outcome.cache_key, outcome.cache_hit);
            let response = ComplianceResponse {
                response: outcome.response_text(),
            };
            println!("{}", serde_json::to_string(&response)?);
        }
    }
    Ok(())
}
