//! Chitti Udi Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - engine: Bowl rules as pure state transitions
//! - repository: Data access abstractions and implementations
//! - commands: Command handlers used by the front end

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;

use config::AppConfig;
use domain::DomainResult;
use repository::{
    init_db, BowlRepository, DeviceStore, InMemoryBowlRepository, InMemoryDeviceStore,
    SqliteBowlRepository, SqliteDeviceStore,
};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    pub bowl_repo: Arc<dyn BowlRepository>,
    pub device_store: Arc<dyn DeviceStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        bowl_repo: Arc<dyn BowlRepository>,
        device_store: Arc<dyn DeviceStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            bowl_repo,
            device_store,
            config,
        }
    }

    /// State backed by in-memory stores; nothing survives the process
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Arc::new(InMemoryBowlRepository::new()),
            Arc::new(InMemoryDeviceStore::new()),
            config,
        )
    }
}

/// Start file logging under the config's log directory.
///
/// A second call is harmless; the first logger stays in place.
pub fn init_logging(config: &AppConfig) {
    match rolling_logger::init_logger(config.log_dir(), &config.app_name) {
        Ok(()) => {}
        Err(rolling_logger::LoggerError::AlreadyInitialized) => {
            log::debug!("logger already initialized");
        }
        Err(e) => eprintln!("failed to init rolling logger: {}", e),
    }
}

/// Open the SQLite database under the config's data directory.
pub async fn init_app(config: AppConfig) -> DomainResult<AppState> {
    let db_path = config.db_path();
    let db_state = init_db(&db_path).await?;
    let _ = rolling_logger::info("DB init success");

    Ok(AppState::new(
        Arc::new(SqliteBowlRepository::new(db_state.connection())),
        Arc::new(SqliteDeviceStore::new(db_state.connection())),
        config,
    ))
}
