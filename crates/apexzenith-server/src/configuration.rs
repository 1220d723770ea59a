//! Configuration management for the daemon

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use apexzenith::config::Paths;
use apexzenith::store::DB_NAME;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Output directory holding the database and log files
    /// (default: ./ApexZenith_Daemon_Output, or ZENITH_DATA_DIR)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Artificial pause before a diagnosis result is produced, in
    /// milliseconds (default: 2000). Purely a pacing affordance for the
    /// dashboard spinner; zero disables it.
    #[serde(default = "default_analysis_delay_ms")]
    pub analysis_delay_ms: u64,

    /// How long a session survives without being touched, in seconds
    /// (default: 3600)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Cap on one session's in-memory history (default: 256). The durable
    /// log is never capped.
    #[serde(default = "default_max_session_history")]
    pub max_session_history: usize,

    /// Whether to also write logs to a daily-rolling file under the data
    /// directory (default: false)
    #[serde(default)]
    pub log_to_file: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> PathBuf {
    // Paths::data_dir already honors ZENITH_DATA_DIR.
    Paths::data_dir()
}

fn default_analysis_delay_ms() -> u64 {
    2000
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_max_session_history() -> usize {
    256
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("ZENITH_HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("ZENITH_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_port);
        let data_dir = default_data_dir();
        let analysis_delay_ms = std::env::var("ZENITH_ANALYSIS_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_analysis_delay_ms);
        let session_ttl_secs = std::env::var("ZENITH_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_session_ttl_secs);
        let max_session_history = std::env::var("ZENITH_MAX_SESSION_HISTORY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_max_session_history);
        if max_session_history == 0 {
            anyhow::bail!("ZENITH_MAX_SESSION_HISTORY must be at least 1");
        }
        let log_to_file = std::env::var("ZENITH_LOG_TO_FILE")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            data_dir,
            analysis_delay_ms,
            session_ttl_secs,
            max_session_history,
            log_to_file,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Full path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_NAME)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            analysis_delay_ms: default_analysis_delay_ms(),
            session_ttl_secs: default_session_ttl_secs(),
            max_session_history: default_max_session_history(),
            log_to_file: false,
        }
    }
}
