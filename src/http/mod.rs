//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer composition)
//!     → middleware/trace.rs (adopt or generate trace id, echo header)
//!     → middleware/fault.rs (render any failure as the failure envelope)
//!     → middleware/envelope.rs (wrap successful payloads)
//!     → middleware/observer.rs (per-handler entry/exit logging)
//!     → handler
//! ```

pub mod error;
pub mod extract;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::{AppError, Failure};
pub use request::{current_trace_id, TraceId};
pub use response::{FailureEnvelope, SuccessEnvelope};
pub use server::{AppState, HttpServer};
