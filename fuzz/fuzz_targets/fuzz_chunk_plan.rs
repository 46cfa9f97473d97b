//! Fuzz target for chunk planning.
//!
//! Arbitrary text must never panic the planner, and the plan must cover the
//! input words exactly once, in order.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mailsift_core::engine::chunking::SINGLE_CHUNK_WORD_LIMIT;
use mailsift_core::engine::plan_chunks;

fuzz_target!(|data: &str| {
    let plan = plan_chunks(data);
    let words: Vec<&str> = data.split_whitespace().collect();

    assert_eq!(plan.total_words, words.len());
    assert_eq!(plan.is_empty(), words.is_empty());

    let rebuilt: Vec<&str> = plan.iter().flat_map(|c| c.words()).collect();
    assert_eq!(rebuilt, words, "chunks must reproduce the word sequence");

    if !words.is_empty() && words.len() <= SINGLE_CHUNK_WORD_LIMIT {
        assert_eq!(plan.len(), 1);
    }

    let mut offset = 0;
    for (i, chunk) in plan.iter().enumerate() {
        assert_eq!(chunk.first_word, offset);
        assert!(chunk.word_count >= 1);
        if words.len() > SINGLE_CHUNK_WORD_LIMIT && i + 1 < plan.len() {
            assert_eq!(chunk.word_count, plan.budget);
        }
        assert!(chunk.bounds.min_len <= chunk.bounds.max_len);
        offset += chunk.word_count;
    }
});
