//! Lnode Server
//!
//! HTTP/JSON provisioning API backed by `SQLite`, mirroring onto the
//! LoRaWAN platform when configured.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lnode_server::api::{AppState, build_router};
use lnode_server::auth::JwtManager;
use lnode_server::config::Config;
use lnode_server::platform::PlatformClient;
use lnode_server::provisioning::Provisioner;
use lnode_server::storage::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env file.
    let _ = dotenvy::dotenv();

    let config = Config::parse();
    init_tracing(&config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.addr,
        "Starting lnode-server"
    );

    let jwt_secret = config.jwt_secret()?;
    if config.jwt_secret.is_empty() {
        warn!("Using the built-in development JWT secret");
    }

    let db_path = config.db_path()?;
    info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).await?;

    let jwt = Arc::new(JwtManager::new(jwt_secret.as_bytes(), config.token_ttl));

    let platform_config = config.platform();
    let platform = PlatformClient::new(&platform_config)?;
    if platform_config.is_enabled() {
        info!(base_url = %platform_config.base_url(), "Platform integration enabled");
    } else {
        warn!("Platform integration disabled; users and devices stay local");
    }

    let provisioner = Arc::new(Provisioner::new(
        db.clone(),
        Arc::clone(&jwt),
        Arc::new(platform),
    ));
    let app = build_router(AppState {
        db,
        jwt,
        provisioner,
    });

    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Install the global subscriber: `--log-filter` directives, human-readable
/// or JSON lines per `--log-json`.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.log_filter()?);
    let fmt = tracing_subscriber::fmt::layer().with_target(true);
    if config.log_json {
        registry.with(fmt.json().flatten_event(true)).try_init()?;
    } else {
        registry.with(fmt).try_init()?;
    }
    Ok(())
}
