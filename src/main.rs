//! WorkClock kiosk service.
//!
//! Usage: `workclock-kiosk [CONFIG_PATH]` (defaults to `./config/kiosk.yaml`).
//! Set `RUST_LOG` to adjust verbosity and `KIOSK_LOG_JSON=1` for JSON logs.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use workclock_kiosk::api::{AppState, create_router};
use workclock_kiosk::client::{HttpBackend, KioskBackend};
use workclock_kiosk::config::{ConfigLoader, KioskConfig};
use workclock_kiosk::error::{KioskError, KioskResult};
use workclock_kiosk::workflow::spawn_kiosk;

const DEFAULT_CONFIG_PATH: &str = "./config/kiosk.yaml";
const LOG_JSON_ENV: &str = "KIOSK_LOG_JSON";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var_os(LOG_JSON_ENV).is_some() {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

fn load_config(path: &str) -> KioskResult<ConfigLoader> {
    let loader = if Path::new(path).exists() {
        ConfigLoader::load(path)?
    } else {
        warn!(path = %path, "Config file not found, using defaults");
        ConfigLoader::from_config(KioskConfig::default())?
    };
    loader.with_env_overrides()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path)?.into_config();

    let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
    match backend.status().await {
        Ok(status) => info!(
            backend = %config.backend.base_url,
            status = %status.status,
            app = status.app.as_deref().unwrap_or("unknown"),
            "Backend reachable"
        ),
        Err(err) => warn!(
            backend = %config.backend.base_url,
            error = %err,
            "Backend status check failed, continuing"
        ),
    }

    let (kiosk, runtime) = spawn_kiosk(backend, config.kiosk);
    let router = create_router(AppState::new(kiosk));

    let listener = TcpListener::bind(config.server.bind).await?;
    info!(bind = %config.server.bind, "Kiosk controller listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last handle, so the runtime winds down now.
    if let Err(err) = runtime.await {
        error!(error = %err, "Kiosk runtime ended abnormally");
        return Err(KioskError::RuntimeClosed.into());
    }
    info!("Kiosk stopped");
    Ok(())
}
