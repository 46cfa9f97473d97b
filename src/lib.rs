//! mailsift core runtime
//!
//! Multi-label email classification and length-adaptive chunked
//! summarization over caller-supplied models, with a one-way
//! accelerator-to-CPU fallback shared by both components.
//!
//! # Flow
//!
//! - [`engine::EmailClassifier`] encodes the text (512 tokens, truncated and
//!   padded), rejects token ids outside the vocabulary, and returns every label
//!   whose sigmoid probability exceeds 0.5, in label order.
//! - [`engine::ChunkedSummarizer`] splits the text into word-count chunks,
//!   summarizes each with size-derived length bounds, and joins the results.
//! - [`pipeline::EmailPipeline`] runs both and produces the
//!   `{categories, summary}` response.
//!
//! Once any accelerator call fails, the shared [`engine::DeviceState`]
//! switches to CPU for the rest of the process lifetime.

pub mod cli;
pub mod config;
pub mod engine;
pub mod health;
pub mod pipeline;
pub mod telemetry;

pub use engine::{Device, DeviceState, InferenceError};
pub use health::{HealthReport, HealthState};
pub use pipeline::{EmailPipeline, ErrorBody, ProcessedEmail};
