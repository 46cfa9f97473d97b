//! [`TextEncoder`] backed by a Hugging Face `tokenizer.json`.

use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

use super::encoding::{EncodeOptions, TextEncoder, TokenEncoding};
use super::error::InferenceError;

/// WordPiece/BPE encoder with truncation and fixed-length padding.
pub struct HfTokenEncoder {
    tokenizer: Tokenizer,
    options: EncodeOptions,
}

impl HfTokenEncoder {
    /// Load `tokenizer.json` and configure it for `options`.
    pub fn from_file(path: &Path, options: EncodeOptions) -> Result<Self, InferenceError> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| InferenceError::Tokenization(format!("load tokenizer: {e}")))?;
        let tokenizer = configure(tokenizer, &options)?;
        info!(path = %path.display(), max_length = options.max_length, "loaded tokenizer");
        Ok(Self { tokenizer, options })
    }
}

fn configure(mut tokenizer: Tokenizer, options: &EncodeOptions) -> Result<Tokenizer, InferenceError> {
    let truncation = options.truncate.then(|| TruncationParams {
        max_length: options.max_length,
        ..Default::default()
    });
    tokenizer
        .with_truncation(truncation)
        .map_err(|e| InferenceError::Tokenization(format!("set truncation: {e}")))?;

    let padding = options.pad_to_max.then(|| {
        let defaults = PaddingParams::default();
        PaddingParams {
            strategy: PaddingStrategy::Fixed(options.max_length),
            pad_id: tokenizer
                .token_to_id(&defaults.pad_token)
                .unwrap_or(defaults.pad_id),
            ..defaults
        }
    });
    tokenizer.with_padding(padding);
    Ok(tokenizer)
}

impl TextEncoder for HfTokenEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<TokenEncoding, InferenceError> {
        let reconfigured;
        let tokenizer = if *options == self.options {
            &self.tokenizer
        } else {
            reconfigured = configure(self.tokenizer.clone(), options)?;
            &reconfigured
        };

        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| InferenceError::Tokenization(format!("tokenize: {e}")))?;
        TokenEncoding::from_parts(
            encoding.get_ids().to_vec(),
            encoding.get_attention_mask().to_vec(),
        )
    }
}
