//! Application state

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use apexzenith::session::SessionRegistry;
use apexzenith::store::DiagnosisLog;

use crate::configuration::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Durable append-only diagnosis log
    pub store: Arc<DiagnosisLog>,

    /// Live sessions
    pub sessions: Arc<SessionRegistry>,

    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create the output directory, open the diagnosis log, and set up the
    /// session registry. Called once on startup and from tests.
    pub async fn initialize(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        info!("Using output directory {}", config.data_dir.display());

        let store = DiagnosisLog::open(&config.db_path()).await?;
        let sessions = SessionRegistry::new(config.session_ttl(), config.max_session_history);

        Ok(Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        })
    }
}
