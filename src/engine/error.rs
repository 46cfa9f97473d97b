//! Inference error types for the mailsift runtime.
//!
//! Token ids outside the vocabulary are rejected, never clamped. Every
//! variant maps onto one of three recovery classes via [`InferenceError::kind`].

use thiserror::Error;

/// Errors that can occur during classification or summarization.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Token ID {max_id} exceeds vocab size {vocab_size}")]
    EncodingOutOfRange { max_id: u32, vocab_size: u32 },

    #[error("Accelerator failure: {0}")]
    AcceleratorFailure(String),

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Label count mismatch: model produced {got} logits for {expected} labels")]
    LabelMismatch { expected: usize, got: usize },

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}

/// Recovery class of an [`InferenceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tokenizer/model mismatch. Never retried.
    EncodingOutOfRange,
    /// Runtime failure on the accelerator. Recovered by one CPU retry.
    AcceleratorFailure,
    /// Anything else. Propagates immediately.
    Unclassified,
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EncodingOutOfRange { .. } => ErrorKind::EncodingOutOfRange,
            Self::AcceleratorFailure(_) => ErrorKind::AcceleratorFailure,
            _ => ErrorKind::Unclassified,
        }
    }

    /// Returns true if the failure qualifies for CPU fallback.
    pub fn is_accelerator_failure(&self) -> bool {
        self.kind() == ErrorKind::AcceleratorFailure
    }

    /// Returns true if the caller supplied input the models cannot handle.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EncodingOutOfRange { .. } | Self::InputValidation(_)
        )
    }
}
