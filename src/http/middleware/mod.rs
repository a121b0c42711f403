//! Request pipeline stages.
//!
//! Outermost first: trace propagation, fault translation, success envelope,
//! then the per-route observer and its panic guard right around each handler.

pub mod envelope;
pub mod fault;
pub mod observer;
pub mod trace;

pub use envelope::wrap_success;
pub use fault::{panic_response, translate_faults, FaultTranslator};
pub use observer::{observe, observed, Observer};
pub use trace::{propagate_trace_id, TraceHeaders};
