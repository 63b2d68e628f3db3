//! DevNet - Developer social network API server

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use devnet_api::{AppState, create_router};
use devnet_auth::JwtManager;
use devnet_db::Database;
use metrics_exporter_prometheus::PrometheusBuilder;

/// DevNet - profiles, posts and discussion for developers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "DEVNET_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Database URL (e.g. sqlite:./data/devnet.db)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration, command line wins
    let (mut config, file_found) = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }
    config.validate()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting DevNet v{}", env!("CARGO_PKG_VERSION"));
    if file_found {
        info!("Loaded configuration from {}", args.config);
    } else {
        info!("Config file not found at {}, using defaults and environment", args.config);
    }

    // Install the metrics recorder before any counter is touched
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics enabled at /metrics");
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create data directory
    if let Some(parent) = config.database.file_path().and_then(|p| p.parent())
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db = Database::new(&config.database.url, config.database.max_connections).await?;

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.token_expiry_secs,
    ));

    // Create router
    let state = AppState::new(db, jwt);
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let fmt_layer = match logging.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
