//! research-loop CLI
//!
//! Runs the refinement loop for one query and prints progress as it goes.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use research_loop::{
    BroadcastEmitter, FallbackCatalog, GoogleSearchProvider, IdeaSource, LoopConfig,
    OfflineIdeaSource, Orchestrator, RandomIncrement, Result, RunReport, SearchConfig,
    SqliteMemoryStore, WebIdeaSource,
};

/// Iterative research-idea refinement
#[derive(Parser)]
#[command(name = "research-loop")]
#[command(about = "Refine a research idea over three scored cycles", long_about = None)]
#[command(version)]
struct Cli {
    /// Research query
    #[arg(default_value = "urban energy solutions")]
    query: String,

    /// Memory database path
    #[arg(long, env = "RESEARCH_LOOP_DB", default_value = "memory.db")]
    db: String,

    /// Seed for fallback picks and score increments
    #[arg(long, env = "RESEARCH_LOOP_SEED")]
    seed: Option<u64>,

    /// Never call the search provider
    #[arg(long)]
    offline: bool,

    /// Log level
    #[arg(long, env = "RESEARCH_LOOP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "RESEARCH_LOOP_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(report) => {
            println!(
                "\nFinal: '{}' - Score: {}/10 after {} cycles",
                report.final_idea,
                report.final_score,
                report.cycles.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Run aborted");
            eprintln!("research-loop: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: &Cli) -> Result<RunReport> {
    let mut config = LoopConfig::new().with_db_path(cli.db.clone());
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let memory = SqliteMemoryStore::open(config.resolved_db_path()?)?;
    let source = build_source(cli, &config)?;
    let increments = Arc::new(RandomIncrement::from_seed_option(config.seed));

    let emitter = Arc::new(BroadcastEmitter::new(64));
    let mut events = emitter.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", event.as_log_line()),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Progress output lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let orchestrator = Orchestrator::new(config, memory, source, increments).with_emitter(emitter);
    let result = orchestrator.execute(&cli.query).await;

    // Dropping the orchestrator closes the event channel
    drop(orchestrator);
    let _ = printer.await;

    result
}

fn build_source(cli: &Cli, config: &LoopConfig) -> Result<Arc<dyn IdeaSource>> {
    let catalog = FallbackCatalog::from_seed_option(config.seed);

    if cli.offline {
        return Ok(Arc::new(OfflineIdeaSource::new(catalog)));
    }

    match SearchConfig::from_env() {
        Ok(search) => {
            let provider = GoogleSearchProvider::new(search)?;
            Ok(Arc::new(
                WebIdeaSource::new(provider, catalog)
                    .with_timeout(Duration::from_millis(config.source_timeout_ms)),
            ))
        }
        Err(err) => {
            warn!(error = %err, "Search credentials missing, using built-in ideas");
            Ok(Arc::new(OfflineIdeaSource::new(catalog)))
        }
    }
}
