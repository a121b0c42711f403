//! Phone inventory HTTP service.
//!
//! Every request passes through one pipeline: trace propagation, fault
//! translation, the success envelope and a per-handler observer. Handlers
//! only talk to the [`inventory::PhoneStore`] facade.

pub mod config;
pub mod http;
pub mod inventory;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown};
