//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the inventory service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Trace id header names.
    pub trace: TraceConfig,

    /// Response envelope policy.
    pub envelope: EnvelopeConfig,

    /// Log sinks and levels.
    pub logging: LoggingConfig,

    /// Inventory store selection and paging limits.
    pub inventory: InventoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Largest request body the observer will buffer.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Header names used by the trace propagation stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Header a caller may use to supply its own trace id.
    pub inbound_header: String,

    /// Header echoing the trace id on every response.
    pub outbound_header: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            inbound_header: "x-trace-id".to_string(),
            outbound_header: "X-Trace-Id".to_string(),
        }
    }
}

/// Failure envelope policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Include `traceId` in failure bodies as well as success bodies.
    pub trace_id_on_failure: bool,

    /// Surface unclassified error text to callers. When false the generic
    /// fallback message is used instead.
    pub expose_internal_messages: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            trace_id_on_failure: false,
            expose_internal_messages: true,
        }
    }
}

/// Rotation period for file sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins for the console.
    pub level: String,

    /// Emit console output.
    pub console: bool,

    /// JSON console output instead of plain text.
    pub json: bool,

    /// Emit the combined, error-only and exception files.
    pub file: bool,

    /// Directory holding the log files.
    pub directory: String,

    /// Rotation period for every file sink.
    pub rotation: LogRotation,

    /// Rotated files kept per sink.
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            json: false,
            file: true,
            directory: "logs".to_string(),
            rotation: LogRotation::Hourly,
            max_files: 14,
        }
    }
}

/// Which store implementation backs the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mysql,
}

/// Inventory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Store implementation.
    pub backend: StoreBackend,

    /// Connection string for the relational backend.
    pub database_url: Option<String>,

    /// Pool size for the relational backend.
    pub max_connections: u32,

    /// Page size used when the caller gives none.
    pub default_page_size: u32,

    /// Largest page size a caller may request.
    pub max_page_size: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 10,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
