use matchlog::{
    store::{InMemoryRecordStore, PostgresRecordStore, SheetsRecordStore},
    AppState, Config, ConfigError, RecordStore, StoreConfig, StoreError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchlog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::load()?;
    info!(bind_addr = %config.bind_addr, "Starting match logging server");

    let store = build_store(&config.store).await?;
    let state = AppState::new(store, config.roster_cache_ttl());

    // Credentials and connectivity are checked before accepting requests
    let players = state.roster.players().await?;
    info!(player_count = players.len(), "Roster loaded");

    let app = matchlog::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, StartupError> {
    let store: Arc<dyn RecordStore> = match config {
        StoreConfig::Memory { players } => {
            warn!(player_count = players.len(), "Using in-memory record store; data is lost on exit");
            Arc::new(InMemoryRecordStore::with_players(players.clone()))
        }
        StoreConfig::Postgres { database_url } => {
            info!("Using PostgreSQL record store");
            Arc::new(PostgresRecordStore::connect(database_url).await?)
        }
        StoreConfig::Sheets(sheets) => {
            info!(
                roster = %sheets.roster_spreadsheet_id,
                stats = %sheets.stats_spreadsheet_id,
                "Using Google Sheets record store"
            );
            Arc::new(SheetsRecordStore::from_config(sheets.clone())?)
        }
    };
    Ok(store)
}
