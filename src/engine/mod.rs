//! Inference engine for the mailsift runtime.
//!
//! Handles token encoding, multi-label classification, chunked
//! summarization and the shared accelerator fallback state. Model weights
//! are supplied by callers through the backend traits.

pub mod chunking;
pub mod classifier;
pub mod device;
pub mod encoding;
pub mod error;
pub mod fallback;
#[cfg(feature = "hf-tokenizer")]
pub mod hf_tokenizer;
pub mod labels;
pub mod summarizer;

pub use chunking::{chunk_word_budget, plan_chunks, Chunk, ChunkPlan, SummaryLengthBounds};
pub use classifier::{
    Classification, ClassificationBackend, EmailClassifier, LogitsModel, CATEGORY_THRESHOLD,
};
pub use device::{detect_accelerator, Device, DeviceState, HandleCache};
pub use encoding::{EncodeOptions, TextEncoder, TokenEncoding, MAX_SEQUENCE_LENGTH};
pub use error::{ErrorKind, InferenceError};
pub use fallback::run_with_fallback;
#[cfg(feature = "hf-tokenizer")]
pub use hf_tokenizer::HfTokenEncoder;
pub use labels::{LabelError, LabelSet};
pub use summarizer::{
    ChunkedSummarizer, GenerationParams, SummarizationBackend, Summary, SummaryModel,
    SUMMARY_INSTRUCTION,
};
