pub mod api;
pub mod avatar;
pub mod config;
pub mod db;
pub mod doctors;
pub mod models;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::AppConfig;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Database initialization failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Cannot create storage root {path}: {source}")]
    Storage {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Server(String),

    #[error("Signal handling failed: {0}")]
    Signal(#[source] std::io::Error),
}

/// Initialize tracing from `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Prepare storage, serve the doctors API until Ctrl-C, then shut down.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    tracing::info!(
        db = %config.db_path.display(),
        storage = %config.storage_root.display(),
        "Using data locations"
    );

    // Apply migrations once up front so a broken database fails at startup.
    db::open_database(&config.db_path)?;

    std::fs::create_dir_all(&config.storage_root).map_err(|source| StartupError::Storage {
        path: config.storage_root.clone(),
        source,
    })?;

    let ctx = ApiContext::new(&config);
    let mut server = api::start_server_on(ctx, config.bind_addr)
        .await
        .map_err(StartupError::Server)?;

    tracing::info!(addr = %server.session.server_addr, "Doctors service ready");

    let signal = tokio::signal::ctrl_c().await;
    server.shutdown();
    server.stopped().await;

    signal.map_err(StartupError::Signal)
}
