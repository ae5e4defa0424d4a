mod api;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use sheetfeed_core::{config, Config};
use sheetfeed_sheets::{RowSource, SheetsClient, SheetsCredential};
use sheetfeed_store::ArtifactStore;
use sheetfeed_sync::{FeedTasks, TriggerKind};

use crate::state::AppState;

/// Spreadsheet-to-JSON feed synchronization service.
#[derive(Parser, Debug)]
#[command(name = "sheetfeed", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server with periodic feed synchronization (default).
    Serve,
    /// Refresh every feed once and exit, non-zero on failure.
    SyncOnce,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::SyncOnce => sync_once(&config).await,
    }
}

/// Wire the row source, artifact store, and per-feed sync tasks.
fn build_tasks(config: &Config) -> anyhow::Result<(FeedTasks, Arc<ArtifactStore>)> {
    let sheet_id = config
        .sheets
        .sheet_id
        .clone()
        .context("SHEET_ID is not set")?;
    let credential = match (&config.sheets.bearer_token, &config.sheets.api_key) {
        (Some(token), _) => SheetsCredential::BearerToken(token.clone()),
        (None, Some(key)) => SheetsCredential::ApiKey(key.clone()),
        (None, None) => anyhow::bail!("set SHEETS_API_KEY or SHEETS_BEARER_TOKEN"),
    };
    let client = match &config.sheets.base_url {
        Some(base) => SheetsClient::with_base_url(base.clone(), sheet_id, credential),
        None => SheetsClient::new(sheet_id, credential),
    };
    let source: Arc<dyn RowSource> = Arc::new(client);

    let store = Arc::new(ArtifactStore::new(&config.output.data_dir)?);
    let tasks = FeedTasks::new(source, Arc::clone(&store), config);
    Ok((tasks, store))
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let (tasks, store) = build_tasks(config)?;
    let state = Arc::new(AppState {
        tasks,
        artifact_dir: store.dir().to_path_buf(),
    });

    // First refresh runs in the background: a bad round must not keep the
    // server from coming up, and every task arms its timer from here.
    let boot = Arc::clone(&state);
    tokio::spawn(async move {
        match boot.tasks.sync_all(TriggerKind::Scheduled).await {
            Ok(refreshed) => info!(feeds = refreshed.len(), "initial sync complete"),
            Err(failure) => warn!(
                branch = %failure.name,
                error = %failure.error,
                "initial sync failed, next scheduled run retries"
            ),
        }
    });

    let app = router::build_router(Arc::clone(&state));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn sync_once(config: &Config) -> anyhow::Result<()> {
    let (tasks, _store) = build_tasks(config)?;
    // Timers armed by the round die with the process right after.
    match tasks.sync_all(TriggerKind::Manual).await {
        Ok(refreshed) => {
            info!(feeds = refreshed.len(), "sync complete");
            Ok(())
        }
        Err(failure) => anyhow::bail!("{failure}"),
    }
}
