//! Folio REST API server binary.
//!
//! Reads configuration from the environment (and `.env`), migrates the
//! database, provisions the bootstrap admin in the background and serves
//! the API until interrupted.

use std::sync::Arc;

use clap::Parser;
use folio_api::config::ApiConfig;
use folio_core::auth::provision::spawn_ensure_admin;
use folio_core::store::Store;
use folio_core::store::pg::PgStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Log filter used when `RUST_LOG` is unset. `tower_http` carries the
/// per-request spans emitted by `TraceLayer`.
const DEFAULT_LOG_FILTER: &str = "info,folio_api=debug,folio_core=debug,tower_http=debug";

/// CLI arguments. Flags override the matching environment variables.
#[derive(Parser, Debug)]
#[command(name = "folio_api_server", about = "Folio REST API server")]
struct Args {
    /// Port to listen on; keeps the host from `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

/// Replace the port of a `host:port` address.
fn with_port(bind_addr: &str, port: u16) -> String {
    let host = bind_addr
        .rsplit_once(':')
        .map_or(bind_addr, |(host, _)| host);
    format!("{host}:{port}")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(port) = args.port {
        config.bind_addr = with_port(&config.bind_addr, port);
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    info!(
        bind_addr = %config.bind_addr,
        environment = config.environment.as_str(),
        max_connections = args.max_connections,
        "starting folio_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    folio_api::migrate(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let state = folio_api::AppState::new(store.clone(), config.clone())?;

    // Runs alongside the listener; requests are served even if it fails.
    spawn_ensure_admin(store, state.hasher, config.admin.clone());

    let app = folio_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
