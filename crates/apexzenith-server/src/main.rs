//! ApexZenith daemon - diagnostics dashboard server
//!
//! Serves the dashboard API: overview metrics, the diagnose flow, and
//! per-session history. Every diagnosis is also appended to a durable
//! SQLite log under the output directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apexzenith_server::configuration::Config;
use apexzenith_server::routes;
use apexzenith_server::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "zenithd", about = "ApexZenith diagnostics dashboard daemon", version)]
struct Cli {
    /// Bind host (overrides ZENITH_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides ZENITH_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Output directory for the database and logs (overrides ZENITH_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Initialize tracing; the file-writer guard must outlive the server.
    let _guard = init_tracing(&config)?;

    info!("Starting ApexZenith daemon on {}:{}", config.host, config.port);

    let state = AppState::initialize(config).await?;
    let app = routes::configure(state.clone());

    let addr = SocketAddr::new(state.config.host.parse()?, state.config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "apexzenith=info,apexzenith_server=info,zenithd=info,tower_http=debug".into());

    if config.log_to_file {
        let log_dir = config.data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = tracing_appender::rolling::daily(log_dir, "zenithd.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        Ok(None)
    }
}
