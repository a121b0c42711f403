//! Phone inventory service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────▶ TraceLayer ─▶ trace id ─▶ fault translator ─▶ envelope ─▶ panic guard
//!                                                                          │
//!                                                                          ▼
//!     Client Response                                          timeout ─▶ router
//!     ◀────── {success, data|message, traceId}                              │
//!                                                                          ▼
//!                                                     observer ─▶ handler ─▶ PhoneStore
//! ```

use std::path::PathBuf;

use clap::Parser;

use phone_inventory::config::{self, AppConfig, ConfigError};
use phone_inventory::lifecycle::{wait_for_signal, Application, Shutdown};
use phone_inventory::observability::{logging, Logger};

#[derive(Debug, Parser)]
#[command(name = "phone-inventory", version, about = "Phone inventory HTTP service")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, env = "PHONE_INVENTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `listener.bind_address`.
    #[arg(long, env = "PHONE_INVENTORY_BIND")]
    bind: Option<String>,

    /// Database URL, overriding `inventory.database_url`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

fn resolve_config(args: Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::read_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(url) = args.database_url {
        config.inventory.database_url = Some(url);
    }
    config::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(Args::parse())?;
    let guard = logging::init(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        backend = ?config.inventory.backend,
        "Configuration loaded"
    );

    let app = Application::build(config, Logger::new()).await?;
    tracing::info!(address = %app.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    app.run(receiver).await?;

    tracing::info!("Shutdown complete");
    guard.shutdown();
    Ok(())
}
