//! Telemetry for the mailsift runtime.
//!
//! Structured logging via `tracing`, per-request spans, and counters through
//! the `metrics` facade. No exporter is installed here; the host process
//! decides where metrics go.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    record_classification, record_device_fallback, record_request, record_summarized_chunks,
};
pub use spans::{RequestSpan, SpanExt};
