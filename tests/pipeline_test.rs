//! End-to-end pipeline tests with recording model doubles.

mod common;

use std::sync::Arc;

use common::{
    words, FixedIdsEncoder, MockClassifierBackend, MockSummarizerBackend, WhitespaceEncoder,
};
use mailsift_core::engine::{
    ChunkedSummarizer, DeviceState, EmailClassifier, InferenceError, LabelSet, TextEncoder,
};
use mailsift_core::{Device, EmailPipeline, ErrorBody, HealthState, ProcessedEmail};

struct Harness {
    pipeline: EmailPipeline,
    classifier: Arc<MockClassifierBackend>,
    summarizer: Arc<MockSummarizerBackend>,
}

fn harness(
    encoder: Arc<dyn TextEncoder>,
    classifier: MockClassifierBackend,
    summarizer: MockSummarizerBackend,
    state: DeviceState,
) -> Harness {
    let state = Arc::new(state);
    let classifier = Arc::new(classifier);
    let summarizer = Arc::new(summarizer);
    let labels = Arc::new(LabelSet::new(["billing", "support", "spam"]).unwrap());
    let pipeline = EmailPipeline::new(
        EmailClassifier::new(encoder, classifier.clone(), labels, Arc::clone(&state)),
        ChunkedSummarizer::new(summarizer.clone(), Arc::clone(&state)),
        state,
    );
    Harness {
        pipeline,
        classifier,
        summarizer,
    }
}

#[test]
fn process_returns_categories_and_summary() {
    let h = harness(
        Arc::new(WhitespaceEncoder),
        MockClassifierBackend::new(vec![4.0, 1.0, -4.0]),
        MockSummarizerBackend::new(),
        DeviceState::cpu_only(),
    );

    let out = h.pipeline.process(&words(1200)).unwrap();
    assert_eq!(
        out,
        ProcessedEmail {
            categories: vec!["billing".into(), "support".into()],
            summary: "[cpu:400w] [cpu:400w] [cpu:400w]".into(),
        }
    );
    assert_eq!(h.classifier.infer_calls().len(), 1);
    assert_eq!(h.summarizer.calls().len(), 3);
}

#[test]
fn classification_error_skips_summarization() {
    let h = harness(
        Arc::new(FixedIdsEncoder(vec![101, 50_000, 102])),
        MockClassifierBackend::new(vec![0.0; 3]),
        MockSummarizerBackend::new(),
        DeviceState::cpu_only(),
    );

    let err = h.pipeline.process("hello").unwrap_err();
    assert!(matches!(err, InferenceError::EncodingOutOfRange { .. }));
    assert!(err.is_client_error());
    assert!(h.summarizer.calls().is_empty());
}

#[test]
fn summarization_error_is_returned() {
    let h = harness(
        Arc::new(WhitespaceEncoder),
        MockClassifierBackend::new(vec![0.0; 3]),
        MockSummarizerBackend::new().failing_on_cpu(),
        DeviceState::cpu_only(),
    );
    let err = h.pipeline.process("short note").unwrap_err();
    assert!(matches!(err, InferenceError::ModelError(_)));
}

#[test]
fn blank_email_gets_empty_summary() {
    let h = harness(
        Arc::new(WhitespaceEncoder),
        MockClassifierBackend::new(vec![-1.0, -1.0, 3.0]),
        MockSummarizerBackend::new(),
        DeviceState::cpu_only(),
    );
    let out = h.pipeline.process("   ").unwrap();
    assert_eq!(out.categories, vec!["spam"]);
    assert_eq!(out.summary, "");
}

#[test]
fn wire_format_matches_the_service_contract() {
    let ok = ProcessedEmail {
        categories: vec!["support".into()],
        summary: "Printer is broken.".into(),
    };
    assert_eq!(
        serde_json::to_string(&ok).unwrap(),
        r#"{"categories":["support"],"summary":"Printer is broken."}"#
    );

    let err = InferenceError::EncodingOutOfRange {
        max_id: 50_000,
        vocab_size: 30_522,
    };
    assert_eq!(
        serde_json::to_string(&ErrorBody::from(&err)).unwrap(),
        r#"{"error":"Token ID 50000 exceeds vocab size 30522"}"#
    );
}

#[test]
fn health_reports_degradation_after_fallback() {
    let h = harness(
        Arc::new(WhitespaceEncoder),
        MockClassifierBackend::new(vec![0.0; 3]).failing_on_accelerator(),
        MockSummarizerBackend::new(),
        DeviceState::new(true),
    );

    let before = h.pipeline.health();
    assert_eq!(before.state, HealthState::Healthy);
    assert_eq!(before.device, Device::Accelerator);
    assert_eq!(before.labels, 3);

    h.pipeline.process(&words(50)).unwrap();

    let after = h.pipeline.health();
    assert!(after.ok);
    assert_eq!(after.state, HealthState::Degraded);
    assert_eq!(after.device, Device::Cpu);
    assert!(after.accelerator_failed);
    assert!(h.summarizer.calls().iter().all(|c| c.device == Device::Cpu));
}

#[tokio::test]
async fn process_blocking_runs_off_the_async_runtime() {
    let h = harness(
        Arc::new(WhitespaceEncoder),
        MockClassifierBackend::new(vec![1.0, -1.0, -1.0]),
        MockSummarizerBackend::new().with_output("Invoice is overdue."),
        DeviceState::cpu_only(),
    );
    let pipeline = Arc::new(h.pipeline);

    let tasks: Vec<_> = (0..4)
        .map(|_| tokio::spawn(Arc::clone(&pipeline).process_blocking(words(120))))
        .collect();
    for task in tasks {
        let out = task.await.unwrap().unwrap();
        assert_eq!(out.categories, vec!["billing"]);
        assert_eq!(out.summary, "Invoice is overdue.");
    }
    assert_eq!(h.summarizer.calls().len(), 4);
}
