//! Length-adaptive chunked summarization.
//!
//! Each chunk of the plan is summarized independently with bounds derived
//! from its own size, and the partial summaries are joined in order. There is
//! no second pass over the joined text.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::chunking::{plan_chunks, ChunkPlan, SummaryLengthBounds};
use super::device::{Device, DeviceState, HandleCache};
use super::error::InferenceError;
use super::fallback::run_with_fallback;
use crate::telemetry;

/// Instruction the email service put in front of every summarization input.
pub const SUMMARY_INSTRUCTION: &str =
    "Summarize this email focusing on purpose, key agenda, dates, and action items:";

/// Per-call generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_len: usize,
    pub min_len: usize,
    /// Greedy/beam decoding with no sampling.
    pub deterministic: bool,
}

impl GenerationParams {
    pub fn for_bounds(bounds: SummaryLengthBounds) -> Self {
        Self {
            max_len: bounds.max_len,
            min_len: bounds.min_len,
            deterministic: true,
        }
    }
}

/// Generative summarizer bound to a single device.
pub trait SummaryModel: Send + Sync {
    fn device(&self) -> Device;

    fn generate(&self, text: &str, params: &GenerationParams) -> Result<String, InferenceError>;
}

/// Loaded summarizer weights that can be bound to a device.
pub trait SummarizationBackend: Send + Sync {
    fn model_id(&self) -> &str;

    /// Bind the model to `device`. Called at most once per device.
    fn load_on(&self, device: Device) -> Result<Arc<dyn SummaryModel>, InferenceError>;
}

/// Joined summary plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
    pub chunks: usize,
    /// None when the input was blank and no model ran.
    pub device: Option<Device>,
}

/// Summarizer shared across requests.
pub struct ChunkedSummarizer {
    backend: Arc<dyn SummarizationBackend>,
    device_state: Arc<DeviceState>,
    handles: HandleCache<dyn SummaryModel>,
    instruction: Option<String>,
}

impl ChunkedSummarizer {
    pub fn new(backend: Arc<dyn SummarizationBackend>, device_state: Arc<DeviceState>) -> Self {
        Self {
            backend,
            device_state,
            handles: HandleCache::new(),
            instruction: None,
        }
    }

    /// Prefix every chunk with `instruction` and a blank line before generation.
    ///
    /// Length bounds still come from the chunk alone.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        let trimmed = instruction.trim();
        self.instruction = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn summarize(&self, text: &str) -> Result<String, InferenceError> {
        self.summarize_detailed(text).map(|s| s.text)
    }

    /// Summarize `text`, re-running every chunk on CPU after an accelerator failure.
    pub fn summarize_detailed(&self, text: &str) -> Result<Summary, InferenceError> {
        let plan = plan_chunks(text);
        if plan.is_empty() {
            return Ok(Summary {
                text: String::new(),
                chunks: 0,
                device: None,
            });
        }

        let result = run_with_fallback(&self.device_state, "summarize", |device| {
            self.summarize_on(&plan, device)
        });
        if self.device_state.is_cpu_only() {
            self.handles.evict(Device::Accelerator);
        }
        result
    }

    fn summarize_on(&self, plan: &ChunkPlan, device: Device) -> Result<Summary, InferenceError> {
        let model = self.handles.get_or_load(device, |d| {
            self.device_state.ensure_usable(d)?;
            self.backend.load_on(d)
        })?;

        let mut parts = Vec::with_capacity(plan.len());
        for (index, chunk) in plan.iter().enumerate() {
            // Another request may have disabled the accelerator mid-document.
            self.device_state.ensure_usable(device)?;
            let params = GenerationParams::for_bounds(chunk.bounds);
            let part = match &self.instruction {
                Some(instruction) => {
                    model.generate(&format!("{instruction}\n\n{}", chunk.text), &params)?
                }
                None => model.generate(&chunk.text, &params)?,
            };
            debug!(
                %device,
                chunk = index,
                words = chunk.word_count,
                min_len = params.min_len,
                max_len = params.max_len,
                "summarized chunk"
            );
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
        }
        telemetry::record_summarized_chunks(plan.len());

        Ok(Summary {
            text: parts.join(" "),
            chunks: plan.len(),
            device: Some(device),
        })
    }
}
