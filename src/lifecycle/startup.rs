//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics endpoint when enabled
//! - Open the inventory store selected by config
//! - Bind the listener and hand everything to the HTTP server
//! - Close the store once the server has drained
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so traffic arrives only when the store is ready

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::inventory::{self, PhoneStore, StoreError};
use crate::observability::{metrics, Logger};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open inventory store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A server with its store opened and listener bound, ready to serve.
pub struct Application {
    server: HttpServer,
    listener: TcpListener,
    store: Arc<dyn PhoneStore>,
}

impl Application {
    /// Initialize subsystems in order from an already validated config.
    pub async fn build(config: AppConfig, logger: Logger) -> Result<Self, StartupError> {
        if config.observability.metrics_enabled {
            let addr: SocketAddr = config
                .observability
                .metrics_address
                .parse()
                .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
            metrics::init_metrics(addr);
        }

        let store = inventory::open_store(&config.inventory).await?;
        tracing::info!(backend = ?config.inventory.backend, "Inventory store ready");

        Self::with_store(config, store, logger).await
    }

    /// Bind the listener around an already opened store.
    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn PhoneStore>,
        logger: Logger,
    ) -> Result<Self, StartupError> {
        let address = config.listener.bind_address.clone();
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(source) => {
                store.close().await;
                return Err(StartupError::Bind { address, source });
            }
        };

        let server = HttpServer::new(config, store.clone(), logger);
        Ok(Self {
            server,
            listener,
            store,
        })
    }

    /// Address actually bound (useful when the config asked for port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` fires, then close the store.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let served = self.server.run(self.listener, shutdown).await;
        self.store.close().await;
        served.map_err(StartupError::Serve)
    }
}
