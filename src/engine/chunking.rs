//! Word-count chunking and per-chunk summary length targets.
//!
//! Long emails are split into contiguous runs of whole words so that each
//! generation call stays within the summarizer's effective context. Chunks
//! never overlap and together reproduce the input word sequence.

use serde::Serialize;

/// Smallest chunk budget in words.
pub const MIN_CHUNK_WORDS: usize = 100;

/// Largest chunk budget in words.
pub const MAX_CHUNK_WORDS: usize = 400;

/// Documents up to three minimum-size chunks are summarized in one pass.
pub const SINGLE_CHUNK_WORD_LIMIT: usize = 3 * MIN_CHUNK_WORDS;

/// Floor and ceiling for a chunk's `max_len`.
pub const SUMMARY_MAX_LEN_RANGE: (usize, usize) = (60, 300);

/// Floor for a chunk's `min_len`.
pub const SUMMARY_MIN_LEN_FLOOR: usize = 20;

/// Words per chunk: a third of the document, clamped to `[100, 400]`.
pub fn chunk_word_budget(total_words: usize) -> usize {
    (total_words / 3).clamp(MIN_CHUNK_WORDS, MAX_CHUNK_WORDS)
}

/// Generation length targets derived from a single chunk's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryLengthBounds {
    pub min_len: usize,
    pub max_len: usize,
}

impl SummaryLengthBounds {
    /// `max_len = clamp(words / 2, 60, 300)`, `min_len = max(20, 0.3 * max_len)`.
    pub fn for_word_count(words: usize) -> Self {
        let (floor, ceiling) = SUMMARY_MAX_LEN_RANGE;
        let max_len = (words / 2).clamp(floor, ceiling);
        let min_len = (max_len * 3 / 10).max(SUMMARY_MIN_LEN_FLOOR);
        Self { min_len, max_len }
    }
}

/// A contiguous run of words from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Index of the chunk's first word in the whole document.
    pub first_word: usize,
    pub word_count: usize,
    /// Words joined by single spaces.
    pub text: String,
    pub bounds: SummaryLengthBounds,
}

impl Chunk {
    fn from_words(first_word: usize, words: &[&str]) -> Self {
        Self {
            first_word,
            word_count: words.len(),
            text: words.join(" "),
            bounds: SummaryLengthBounds::for_word_count(words.len()),
        }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split(' ')
    }
}

/// How a document will be summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    pub total_words: usize,
    pub budget: usize,
    pub chunks: Vec<Chunk>,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }
}

/// Split `text` into whitespace-delimited words and pack them greedily.
///
/// Every chunk except possibly the last holds exactly the budget; a word is
/// never split. Blank input yields an empty plan.
pub fn plan_chunks(text: &str) -> ChunkPlan {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total_words = words.len();
    let budget = chunk_word_budget(total_words);

    if total_words == 0 {
        return ChunkPlan {
            total_words,
            budget,
            chunks: Vec::new(),
        };
    }

    let chunk_len = if total_words <= SINGLE_CHUNK_WORD_LIMIT {
        total_words
    } else {
        budget
    };

    let chunks = words
        .chunks(chunk_len)
        .enumerate()
        .map(|(i, run)| Chunk::from_words(i * chunk_len, run))
        .collect();

    ChunkPlan {
        total_words,
        budget,
        chunks,
    }
}
