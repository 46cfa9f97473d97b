//! Multi-label email classification.
//!
//! Text is encoded into a fixed 512-token window, checked against the model
//! vocabulary, scored by a sequence classifier and thresholded per label.
//! Labels are independent: any subset of the [`LabelSet`] may be returned.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::device::{Device, DeviceState, HandleCache};
use super::encoding::{EncodeOptions, TextEncoder, TokenEncoding};
use super::error::InferenceError;
use super::fallback::run_with_fallback;
use super::labels::LabelSet;
use crate::telemetry;

/// Probability a label must exceed to be selected.
pub const CATEGORY_THRESHOLD: f32 = 0.5;

/// Sequence classifier bound to a single device.
pub trait LogitsModel: Send + Sync {
    fn device(&self) -> Device;

    /// Forward pass in inference mode. Returns one logit per label.
    fn infer(&self, encoding: &TokenEncoding) -> Result<Vec<f32>, InferenceError>;
}

/// Loaded classifier weights that can be bound to a device.
pub trait ClassificationBackend: Send + Sync {
    fn model_id(&self) -> &str;

    /// Size of the embedding table; every token id must be below it.
    fn vocab_size(&self) -> u32;

    /// Bind the model to `device`. Called at most once per device.
    fn load_on(&self, device: Device) -> Result<Arc<dyn LogitsModel>, InferenceError>;
}

/// Outcome of one classification, with per-label probabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Selected labels in label-set order.
    pub categories: Vec<String>,
    /// Sigmoid probability for every label, indexed like the label set.
    pub probabilities: Vec<f32>,
    /// Device the successful attempt ran on.
    pub device: Device,
}

/// Classifier adapter shared across requests.
pub struct EmailClassifier {
    encoder: Arc<dyn TextEncoder>,
    backend: Arc<dyn ClassificationBackend>,
    labels: Arc<LabelSet>,
    device_state: Arc<DeviceState>,
    handles: HandleCache<dyn LogitsModel>,
    options: EncodeOptions,
}

impl EmailClassifier {
    pub fn new(
        encoder: Arc<dyn TextEncoder>,
        backend: Arc<dyn ClassificationBackend>,
        labels: Arc<LabelSet>,
        device_state: Arc<DeviceState>,
    ) -> Self {
        Self {
            encoder,
            backend,
            labels,
            device_state,
            handles: HandleCache::new(),
            options: EncodeOptions::default(),
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    /// Classify `text` into zero or more categories, in label-set order.
    pub fn classify(&self, text: &str) -> Result<Vec<String>, InferenceError> {
        self.classify_detailed(text).map(|c| c.categories)
    }

    /// Classify `text`, keeping the probabilities and the device used.
    pub fn classify_detailed(&self, text: &str) -> Result<Classification, InferenceError> {
        let result = run_with_fallback(&self.device_state, "classify", |device| {
            self.classify_on(text, device)
        });
        if self.device_state.is_cpu_only() {
            self.handles.evict(Device::Accelerator);
        }
        telemetry::record_classification(&result);
        result
    }

    fn classify_on(&self, text: &str, device: Device) -> Result<Classification, InferenceError> {
        let encoding = self.encoder.encode(text, &self.options)?;
        if encoding.len() != self.options.max_length {
            return Err(InferenceError::Tokenization(format!(
                "encoder produced {} positions, expected {}",
                encoding.len(),
                self.options.max_length
            )));
        }

        let vocab_size = self.backend.vocab_size();
        if let Err(err) = encoding.check_vocab(vocab_size) {
            warn!(model_id = self.backend.model_id(), error = %err, "encoding rejected before inference");
            return Err(err);
        }

        let model = self.handles.get_or_load(device, |d| {
            self.device_state.ensure_usable(d)?;
            self.backend.load_on(d)
        })?;
        self.device_state.ensure_usable(device)?;
        let logits = model.infer(&encoding)?;
        if logits.len() != self.labels.len() {
            return Err(InferenceError::LabelMismatch {
                expected: self.labels.len(),
                got: logits.len(),
            });
        }

        let probabilities: Vec<f32> = logits.iter().map(|&logit| sigmoid(logit)).collect();
        let categories = select_categories(&self.labels, &probabilities);
        debug!(
            %device,
            tokens = encoding.attended(),
            selected = categories.len(),
            "classified text"
        );

        Ok(Classification {
            categories,
            probabilities,
            device,
        })
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Every label whose probability exceeds [`CATEGORY_THRESHOLD`], in label order.
pub fn select_categories(labels: &LabelSet, probabilities: &[f32]) -> Vec<String> {
    labels
        .iter()
        .zip(probabilities)
        .filter(|(_, p)| **p > CATEGORY_THRESHOLD)
        .map(|(name, _)| name.to_string())
        .collect()
}
