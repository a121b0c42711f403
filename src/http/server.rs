//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the inventory and health handlers
//! - Wrap every handler in its observer
//! - Compose the request pipeline (trace, faults, envelope, panics, timeout)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::error::route_not_found;
use crate::http::middleware::{
    observed, panic_response, propagate_trace_id, translate_faults, wrap_success, FaultTranslator,
    Observer, TraceHeaders,
};
use crate::inventory::{handlers, PhoneStore};
use crate::observability::Logger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PhoneStore>,
    pub logger: Logger,
    pub config: Arc<AppConfig>,
}

/// HTTP server for the inventory API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: AppConfig, store: Arc<dyn PhoneStore>, logger: Logger) -> Self {
        let state = AppState {
            store,
            logger,
            config: Arc::new(config),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// The fully composed router, for driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();
        let max_body = config.listener.max_body_bytes;
        let logger = state.logger.clone();
        let observer = |handler: &'static str| Observer::new(logger.clone(), handler, max_body);

        let translator = FaultTranslator::new(logger.clone(), config.envelope.clone());

        Router::new()
            .route(
                "/phone",
                observed(get(handlers::find_all), observer("PhoneController.findAll")),
            )
            .route(
                "/phone/add",
                observed(post(handlers::add), observer("PhoneController.add")),
            )
            .route(
                "/phone/{id}",
                observed(patch(handlers::update), observer("PhoneController.update")).merge(
                    observed(delete(handlers::remove), observer("PhoneController.remove")),
                ),
            )
            .route(
                "/health",
                observed(get(health_check), observer("HealthController.check")),
            )
            .fallback(route_not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(wrap_success))
            .layer(middleware::from_fn_with_state(translator, translate_faults))
            .layer(middleware::from_fn_with_state(
                TraceHeaders::from_config(&config.trace),
                propagate_trace_id,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /health`
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
