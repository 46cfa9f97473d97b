//! Counters and histograms recorded through the `metrics` facade.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::engine::{ErrorKind, InferenceError};

/// One accelerator-to-CPU transition.
pub fn record_device_fallback(operation: &str) {
    counter!("mailsift_device_fallback_total", "operation" => operation.to_string()).increment(1);
}

/// Outcome of a classification call.
pub fn record_classification<T>(result: &Result<T, InferenceError>) {
    let status = match result {
        Ok(_) => "ok",
        Err(e) => match e.kind() {
            ErrorKind::EncodingOutOfRange => {
                counter!("mailsift_encoding_out_of_range_total").increment(1);
                "encoding_out_of_range"
            }
            ErrorKind::AcceleratorFailure => "accelerator_failure",
            ErrorKind::Unclassified => "error",
        },
    };
    counter!("mailsift_classify_total", "status" => status).increment(1);
}

/// Chunks sent through the summarizer by one successful attempt.
pub fn record_summarized_chunks(chunks: usize) {
    counter!("mailsift_summarize_chunks_total").increment(chunks as u64);
}

/// End-to-end latency of one `process` call.
pub fn record_request(latency: Duration, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    histogram!("mailsift_request_latency_seconds", "status" => status).record(latency.as_secs_f64());
}
