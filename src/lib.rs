pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{ServiceConfig, StoreConfig};
use crate::core_state::CoreState;
use crate::pipeline::extraction::TesseractCli;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Store initialization failed: {0}")]
    Store(#[from] db::DatabaseError),
    #[error("Cannot start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Server(#[from] api::server::ServerError),
}

/// Service entry point: logging, configuration, collaborators, HTTP server.
pub fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env()?;
    log_startup_checks(&config);

    // Built before the runtime: the PostgREST store owns a blocking client,
    // which cannot be created or dropped inside async code.
    let addr = config.bind_addr;
    let core = Arc::new(CoreState::from_config(config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(RunError::Runtime)?;
    let result = runtime.block_on(api::serve(Arc::clone(&core), addr));
    drop(runtime);
    drop(core);

    result?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

fn log_startup_checks(config: &ServiceConfig) {
    if config.api_key.is_none() {
        tracing::error!(
            "API_KEY is not set; protected endpoints will answer 500 until it is configured"
        );
    }

    match &config.store {
        StoreConfig::Sqlite { path } => {
            tracing::info!(path = %path.display(), "Using SQLite store")
        }
        StoreConfig::Supabase { url, .. } => tracing::info!(%url, "Using Supabase store"),
    }

    let tesseract = TesseractCli::new(config.ocr.command.clone());
    match tesseract.version() {
        Ok(version) => tracing::info!(%version, lang = %config.ocr.lang, "Tesseract available"),
        Err(e) => tracing::error!(
            error = %e,
            "Tesseract not usable; uploads will fail until it is installed"
        ),
    }
}
