//! Span utilities for request tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for standardized email-processing spans.
pub struct RequestSpan;

impl RequestSpan {
    /// Create a span for one `process` call.
    ///
    /// `status`, `error.message`, `latency_ms`, `categories`, `chunks` and
    /// `device` start empty and are filled in as the request completes.
    pub fn new(request_id: &str, input_bytes: usize) -> Span {
        info_span!(
            "process_email",
            request_id = %request_id,
            input_bytes,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            categories = tracing::field::Empty,
            chunks = tracing::field::Empty,
            device = tracing::field::Empty,
        )
    }
}
