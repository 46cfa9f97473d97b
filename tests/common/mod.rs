//! Recording test doubles for the classifier and summarizer backends.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use parking_lot::Mutex;

use mailsift_core::engine::{
    ClassificationBackend, Device, DeviceState, EncodeOptions, GenerationParams, InferenceError,
    LogitsModel, SummarizationBackend, SummaryModel, TextEncoder, TokenEncoding,
};

pub const CLS_ID: u32 = 101;
pub const SEP_ID: u32 = 102;
pub const PAD_ID: u32 = 0;
pub const MOCK_VOCAB_SIZE: u32 = 30_522;

/// `n` distinct words separated by single spaces.
pub fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

pub fn accel_err() -> InferenceError {
    InferenceError::AcceleratorFailure("CUDA error: an illegal memory access was encountered".into())
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// One token per whitespace word, wrapped in `[CLS]`/`[SEP]`.
pub struct WhitespaceEncoder;

impl TextEncoder for WhitespaceEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<TokenEncoding, InferenceError> {
        let mut ids = vec![CLS_ID];
        ids.extend(text.split_whitespace().map(|w| 1000 + (w.len() as u32 % 1000)));
        ids.push(SEP_ID);
        Ok(TokenEncoding::from_ids(ids, PAD_ID, options))
    }
}

/// Always yields the given ids, regardless of input.
pub struct FixedIdsEncoder(pub Vec<u32>);

impl TextEncoder for FixedIdsEncoder {
    fn encode(&self, _text: &str, options: &EncodeOptions) -> Result<TokenEncoding, InferenceError> {
        Ok(TokenEncoding::from_ids(self.0.clone(), PAD_ID, options))
    }
}

/// Whitespace encoder that disables the accelerator during its `flip_on`-th
/// call (0-based), the way a concurrent request failing elsewhere would.
pub struct FlippingEncoder {
    state: Arc<DeviceState>,
    flip_on: usize,
    calls: Mutex<usize>,
}

impl FlippingEncoder {
    pub fn on_call(state: Arc<DeviceState>, flip_on: usize) -> Self {
        Self {
            state,
            flip_on,
            calls: Mutex::new(0),
        }
    }
}

impl TextEncoder for FlippingEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<TokenEncoding, InferenceError> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls - 1
        };
        if call == self.flip_on {
            self.state
                .mark_accelerator_failed("concurrent-request", &"CUDA error: out of memory");
        }
        WhitespaceEncoder.encode(text, options)
    }
}

// ---------------------------------------------------------------------------
// Classifier backend
// ---------------------------------------------------------------------------

/// Shared record of what the mock classifier saw.
#[derive(Default)]
pub struct ClassifierLog {
    pub loads: Vec<Device>,
    pub infers: Vec<Device>,
    pub last_encoding_len: Option<usize>,
}

pub struct MockClassifierBackend {
    pub logits: Vec<f32>,
    pub vocab_size: u32,
    /// Accelerator forward passes fail with an accelerator error.
    pub fail_on_accelerator: bool,
    /// CPU forward passes fail with a model error.
    pub fail_on_cpu: bool,
    pub log: Arc<Mutex<ClassifierLog>>,
}

impl MockClassifierBackend {
    pub fn new(logits: Vec<f32>) -> Self {
        Self {
            logits,
            vocab_size: MOCK_VOCAB_SIZE,
            fail_on_accelerator: false,
            fail_on_cpu: false,
            log: Arc::new(Mutex::new(ClassifierLog::default())),
        }
    }

    pub fn failing_on_accelerator(mut self) -> Self {
        self.fail_on_accelerator = true;
        self
    }

    pub fn failing_on_cpu(mut self) -> Self {
        self.fail_on_cpu = true;
        self
    }

    pub fn with_vocab_size(mut self, vocab_size: u32) -> Self {
        self.vocab_size = vocab_size;
        self
    }

    pub fn infer_calls(&self) -> Vec<Device> {
        self.log.lock().infers.clone()
    }

    pub fn load_calls(&self) -> Vec<Device> {
        self.log.lock().loads.clone()
    }
}

impl ClassificationBackend for MockClassifierBackend {
    fn model_id(&self) -> &str {
        "mock/email-classifier"
    }

    fn vocab_size(&self) -> u32 {
        self.vocab_size
    }

    fn load_on(&self, device: Device) -> Result<Arc<dyn LogitsModel>, InferenceError> {
        self.log.lock().loads.push(device);
        let fail = match device {
            Device::Accelerator => self.fail_on_accelerator,
            Device::Cpu => self.fail_on_cpu,
        };
        Ok(Arc::new(MockLogitsModel {
            device,
            logits: self.logits.clone(),
            fail,
            log: Arc::clone(&self.log),
        }))
    }
}

struct MockLogitsModel {
    device: Device,
    logits: Vec<f32>,
    fail: bool,
    log: Arc<Mutex<ClassifierLog>>,
}

impl LogitsModel for MockLogitsModel {
    fn device(&self) -> Device {
        self.device
    }

    fn infer(&self, encoding: &TokenEncoding) -> Result<Vec<f32>, InferenceError> {
        {
            let mut log = self.log.lock();
            log.infers.push(self.device);
            log.last_encoding_len = Some(encoding.len());
        }
        if self.fail {
            return Err(match self.device {
                Device::Accelerator => accel_err(),
                Device::Cpu => InferenceError::ModelError("cpu forward pass failed".into()),
            });
        }
        Ok(self.logits.clone())
    }
}

// ---------------------------------------------------------------------------
// Summarizer backend
// ---------------------------------------------------------------------------

/// One generation call as seen by the mock summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub device: Device,
    pub words: usize,
    pub params: GenerationParams,
}

#[derive(Default)]
pub struct SummarizerLog {
    pub loads: Vec<Device>,
    pub calls: Vec<GenerateCall>,
    pub texts: Vec<String>,
}

pub struct MockSummarizerBackend {
    /// Fail the accelerator call for this chunk index (0-based, counted per attempt).
    pub accel_fail_at_chunk: Option<usize>,
    pub fail_on_cpu: bool,
    /// Output produced for every chunk instead of the default tag.
    pub fixed_output: Option<String>,
    /// Disable the accelerator on this state during the first accelerator call,
    /// which itself still succeeds.
    pub flip_on_first_accelerator_call: Option<Arc<DeviceState>>,
    pub log: Arc<Mutex<SummarizerLog>>,
}

impl MockSummarizerBackend {
    pub fn new() -> Self {
        Self {
            accel_fail_at_chunk: None,
            fail_on_cpu: false,
            fixed_output: None,
            flip_on_first_accelerator_call: None,
            log: Arc::new(Mutex::new(SummarizerLog::default())),
        }
    }

    pub fn flipping_state_on_first_call(mut self, state: Arc<DeviceState>) -> Self {
        self.flip_on_first_accelerator_call = Some(state);
        self
    }

    /// Texts handed to the model, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.log.lock().texts.clone()
    }

    pub fn failing_on_accelerator_at(mut self, chunk: usize) -> Self {
        self.accel_fail_at_chunk = Some(chunk);
        self
    }

    pub fn failing_on_cpu(mut self) -> Self {
        self.fail_on_cpu = true;
        self
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.fixed_output = Some(output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.log.lock().calls.clone()
    }

    pub fn load_calls(&self) -> Vec<Device> {
        self.log.lock().loads.clone()
    }
}

impl Default for MockSummarizerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SummarizationBackend for MockSummarizerBackend {
    fn model_id(&self) -> &str {
        "mock/summarizer"
    }

    fn load_on(&self, device: Device) -> Result<Arc<dyn SummaryModel>, InferenceError> {
        self.log.lock().loads.push(device);
        Ok(Arc::new(MockSummaryModel {
            device,
            accel_fail_at_chunk: self.accel_fail_at_chunk,
            fail_on_cpu: self.fail_on_cpu,
            fixed_output: self.fixed_output.clone(),
            flip_state: self.flip_on_first_accelerator_call.clone(),
            attempt_calls: Mutex::new(0),
            log: Arc::clone(&self.log),
        }))
    }
}

struct MockSummaryModel {
    device: Device,
    accel_fail_at_chunk: Option<usize>,
    fail_on_cpu: bool,
    fixed_output: Option<String>,
    flip_state: Option<Arc<DeviceState>>,
    attempt_calls: Mutex<usize>,
    log: Arc<Mutex<SummarizerLog>>,
}

impl SummaryModel for MockSummaryModel {
    fn device(&self) -> Device {
        self.device
    }

    fn generate(&self, text: &str, params: &GenerationParams) -> Result<String, InferenceError> {
        let words = text.split_whitespace().count();
        {
            let mut log = self.log.lock();
            log.calls.push(GenerateCall {
                device: self.device,
                words,
                params: *params,
            });
            log.texts.push(text.to_string());
        }

        let index = {
            let mut calls = self.attempt_calls.lock();
            let index = *calls;
            *calls += 1;
            index
        };
        match self.device {
            Device::Accelerator if index == 0 && self.flip_state.is_some() => {
                if let Some(state) = &self.flip_state {
                    state.mark_accelerator_failed("concurrent-request", &"CUDA error: out of memory");
                }
            }
            Device::Accelerator if self.accel_fail_at_chunk == Some(index) => {
                return Err(accel_err())
            }
            Device::Cpu if self.fail_on_cpu => {
                return Err(InferenceError::ModelError("generation failed".into()))
            }
            _ => {}
        }

        Ok(match &self.fixed_output {
            Some(out) => out.clone(),
            None => format!("[{}:{}w]", self.device, words),
        })
    }
}

// ---------------------------------------------------------------------------
// Metrics capture
// ---------------------------------------------------------------------------

/// Recorder that keeps every counter in memory.
///
/// Install with `metrics::with_local_recorder`, which scopes it to the
/// current thread so parallel tests do not see each other's counts.
#[derive(Default)]
pub struct CaptureRecorder {
    counters: Mutex<BTreeMap<String, Arc<AtomicU64>>>,
}

impl CaptureRecorder {
    fn series(key: &Key) -> String {
        let mut labels: Vec<String> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        labels.sort();
        format!("{}{{{}}}", key.name(), labels.join(","))
    }

    /// Value of the counter `name` with exactly these labels.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let mut labels: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
        labels.sort();
        let series = format!("{name}{{{}}}", labels.join(","));
        self.counters
            .lock()
            .get(&series)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum of `name` across all label sets.
    pub fn counter_total(&self, name: &str) -> u64 {
        let prefix = format!("{name}{{");
        self.counters
            .lock()
            .iter()
            .filter(|(series, _)| series.starts_with(&prefix))
            .map(|(_, c)| c.load(Ordering::SeqCst))
            .sum()
    }
}

impl Recorder for CaptureRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let counter = Arc::clone(self.counters.lock().entry(Self::series(key)).or_default());
        Counter::from_arc(counter)
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
