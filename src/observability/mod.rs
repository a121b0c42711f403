//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (leveled records through the injected Logger)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → console, rotating combined / error / exception files
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Trace id flows through every request-scoped record as a `[id]` prefix
//!   and as a field of the enclosing `request` span
//! - Metrics are cheap and off unless configured

pub mod logging;
pub mod metrics;

pub use logging::{LogGuard, LogLevel, LogMessage, Logger, LoggingError, RequestLogger};
