//! Fixed-length token encodings for the sequence classifier.

use super::error::InferenceError;

/// Classifier input window in tokens.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// How raw text is fitted into the classifier window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub max_length: usize,
    /// Pad shorter sequences up to `max_length`.
    pub pad_to_max: bool,
    /// Cut longer sequences down to `max_length`.
    pub truncate: bool,
}

impl EncodeOptions {
    /// Truncate and pad to exactly `max_length` positions.
    pub fn fixed(max_length: usize) -> Self {
        Self {
            max_length,
            pad_to_max: true,
            truncate: true,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::fixed(MAX_SEQUENCE_LENGTH)
    }
}

/// Token ids plus attention mask, always of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEncoding {
    input_ids: Vec<u32>,
    attention_mask: Vec<u32>,
}

impl TokenEncoding {
    /// Build an encoding from raw ids, applying truncation and padding.
    ///
    /// Padding positions carry `pad_id` with a zero mask.
    pub fn from_ids(mut ids: Vec<u32>, pad_id: u32, options: &EncodeOptions) -> Self {
        if options.truncate {
            ids.truncate(options.max_length);
        }
        let real = ids.len();
        let mut attention_mask = vec![1; real];
        if options.pad_to_max && real < options.max_length {
            ids.resize(options.max_length, pad_id);
            attention_mask.resize(options.max_length, 0);
        }
        Self {
            input_ids: ids,
            attention_mask,
        }
    }

    /// Build an encoding from tokenizer output.
    pub fn from_parts(
        input_ids: Vec<u32>,
        attention_mask: Vec<u32>,
    ) -> Result<Self, InferenceError> {
        if input_ids.len() != attention_mask.len() {
            return Err(InferenceError::Tokenization(format!(
                "attention mask length {} does not match {} input ids",
                attention_mask.len(),
                input_ids.len()
            )));
        }
        Ok(Self {
            input_ids,
            attention_mask,
        })
    }

    pub fn input_ids(&self) -> &[u32] {
        &self.input_ids
    }

    pub fn attention_mask(&self) -> &[u32] {
        &self.attention_mask
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Number of non-padding positions.
    pub fn attended(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }

    pub fn max_id(&self) -> Option<u32> {
        self.input_ids.iter().copied().max()
    }

    /// Reject encodings containing an id the model has no embedding for.
    pub fn check_vocab(&self, vocab_size: u32) -> Result<(), InferenceError> {
        match self.max_id() {
            Some(max_id) if max_id >= vocab_size => {
                Err(InferenceError::EncodingOutOfRange { max_id, vocab_size })
            }
            _ => Ok(()),
        }
    }
}

/// Tokenizer half of the classifier collaborator.
pub trait TextEncoder: Send + Sync {
    /// Encode `text` deterministically according to `options`.
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<TokenEncoding, InferenceError>;
}
