//! Email processing: classification followed by summarization.
//!
//! Neither step consumes the other's output. Errors from either step are
//! returned to the caller unchanged; the boundary layer turns them into a
//! failure response (see [`ErrorBody`]).

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, Span};
use uuid::Uuid;

use crate::engine::{ChunkedSummarizer, DeviceState, EmailClassifier, InferenceError};
use crate::health::{HealthChecker, HealthReport};
use crate::telemetry::{self, RequestSpan, SpanExt};

/// Response body: `{"categories": [...], "summary": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEmail {
    pub categories: Vec<String>,
    pub summary: String,
}

/// Failure body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&InferenceError> for ErrorBody {
    fn from(err: &InferenceError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Classifier and summarizer sharing one device state.
pub struct EmailPipeline {
    classifier: EmailClassifier,
    summarizer: ChunkedSummarizer,
    device_state: Arc<DeviceState>,
    health: HealthChecker,
}

impl EmailPipeline {
    pub fn new(
        classifier: EmailClassifier,
        summarizer: ChunkedSummarizer,
        device_state: Arc<DeviceState>,
    ) -> Self {
        Self {
            classifier,
            summarizer,
            device_state,
            health: HealthChecker::new(),
        }
    }

    pub fn classifier(&self) -> &EmailClassifier {
        &self.classifier
    }

    pub fn summarizer(&self) -> &ChunkedSummarizer {
        &self.summarizer
    }

    pub fn device_state(&self) -> &DeviceState {
        &self.device_state
    }

    /// Classify then summarize `text`.
    pub fn process(&self, text: &str) -> Result<ProcessedEmail, InferenceError> {
        let request_id = Uuid::new_v4().to_string();
        let span = RequestSpan::new(&request_id, text.len());
        let _guard = span.enter();
        let started = Instant::now();

        let result = self.run(text, &span);

        let latency = started.elapsed();
        span.record("latency_ms", latency.as_millis() as u64);
        span.record_result(&result);
        telemetry::record_request(latency, result.is_ok());
        match &result {
            Ok(email) => info!(categories = ?email.categories, "processed email"),
            Err(e) => error!(error = %e, kind = ?e.kind(), "email processing failed"),
        }
        result
    }

    fn run(&self, text: &str, span: &Span) -> Result<ProcessedEmail, InferenceError> {
        let classification = self.classifier.classify_detailed(text)?;
        span.record("categories", classification.categories.len() as u64);

        let summary = self.summarizer.summarize_detailed(text)?;
        span.record("chunks", summary.chunks as u64);
        span.record("device", self.device_state.current().to_string().as_str());

        Ok(ProcessedEmail {
            categories: classification.categories,
            summary: summary.text,
        })
    }

    /// Run [`process`](Self::process) on a blocking thread for async callers.
    pub async fn process_blocking(
        self: Arc<Self>,
        text: String,
    ) -> Result<ProcessedEmail, InferenceError> {
        tokio::task::spawn_blocking(move || self.process(&text))
            .await
            .map_err(|e| InferenceError::TaskFailed(e.to_string()))?
    }

    pub fn health(&self) -> HealthReport {
        self.health
            .report(&self.device_state, self.classifier.labels().len())
    }
}
