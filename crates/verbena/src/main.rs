//! Verbena - conversational beauty-salon assistant.
//!
//! Main entry point for the Verbena CLI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config;

use config::AppConfig;

use verbena_agent::tools::default_registry;
use verbena_agent::{Agent, AgentConfig, ChatService};
use verbena_llm::{OpenAiBackend, OpenAiConfig, SharedBackend};
use verbena_salon::{BeautyAdvisor, InMemorySalon};
use verbena_server::Server;
use verbena_session::{SessionStore, StoreConfig};
use verbena_suggest::{InMemoryIndex, SuggestConfig, SuggestionEngine};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Verbena - conversational beauty-salon assistant
#[derive(Parser)]
#[command(name = "verbena")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a configuration file
    #[arg(long, global = true, env = "VERBENA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address override, e.g. 0.0.0.0:8080
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },

    /// Ask a one-shot question
    Ask {
        /// The question to ask
        question: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            let service = build_service(&config)?;
            let cleanup = service.spawn_cleanup_task();
            if cleanup.is_none() {
                tracing::info!("Idle-session cleanup disabled");
            }

            let addr = bind.unwrap_or(config.server.bind);
            Server::new(service).run(addr).await?;
        }
        Commands::Ask { question } => {
            let service = build_service(&config)?;
            let session_id = format!("cli-{}", uuid::Uuid::new_v4());

            let reply = service.handle_turn(&session_id, &question).await;
            println!("{reply}");

            let suggestions = service.get_suggestions(&session_id, None).await;
            if !suggestions.is_empty() {
                println!("\nYou could also ask:");
                for suggestion in suggestions {
                    println!("  - {suggestion}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_filter = if verbose { "verbena=debug,info" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            ),
        )
        .init();
}

/// Wire the full conversational core from configuration.
fn build_service(config: &AppConfig) -> Result<ChatService> {
    let backend = build_backend(config)?;

    let salon = Arc::new(InMemorySalon::new());
    let index = Arc::new(InMemoryIndex::with_default_questions());

    let registry = default_registry(salon, index.clone(), BeautyAdvisor::new())?;

    let agent_config = AgentConfig::new(&config.reasoning.model)
        .with_max_tokens(config.agent.max_tokens)
        .with_temperature(config.reasoning.temperature)
        .with_max_iterations(config.agent.max_iterations)
        .with_history_window(config.agent.history_window)
        .with_reasoning_timeout(Duration::from_secs(config.reasoning.timeout_secs))
        .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));
    let agent = Agent::new(backend, registry, agent_config);

    let mut store_config = StoreConfig::default()
        .with_max_sessions(config.sessions.max_sessions)
        .with_cleanup_interval(Duration::from_secs(config.sessions.cleanup_interval_secs));
    if let Some(idle) = config.idle_timeout() {
        store_config = store_config.with_idle_timeout(idle);
    }
    let store = SessionStore::new(store_config);

    let suggester = SuggestionEngine::new(
        index,
        SuggestConfig::default()
            .with_limit(config.suggestions.limit)
            .with_min_score(config.suggestions.min_score)
            .with_candidate_pool(config.suggestions.candidate_pool),
    );

    Ok(ChatService::new(agent, store, suggester))
}

fn build_backend(config: &AppConfig) -> Result<SharedBackend> {
    let api_key = AppConfig::api_key();
    let is_local = config.reasoning.base_url.contains("localhost")
        || config.reasoning.base_url.contains("127.0.0.1");
    anyhow::ensure!(
        api_key.is_some() || is_local,
        "no API key configured: set VERBENA_API_KEY or OPENAI_API_KEY, \
         or point [reasoning].base_url at a local endpoint"
    );

    let mut backend_config = match api_key {
        Some(key) => OpenAiConfig::openai(key),
        None => OpenAiConfig::ollama(),
    };
    backend_config = backend_config
        .with_base_url(config.reasoning.base_url.clone())
        .with_timeout(Duration::from_secs(config.reasoning.timeout_secs));

    Ok(Arc::new(OpenAiBackend::new(backend_config)?))
}
