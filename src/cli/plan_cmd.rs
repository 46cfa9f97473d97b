//! `plan <file|-> [--json]`: show how a document would be chunked for
//! summarization, without loading any model.

use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use crate::engine::{plan_chunks, ChunkPlan};

/// Read `source` (a path, or `-` for stdin) and print its chunk plan.
pub fn run_plan(source: &str, json: bool) -> i32 {
    let text = match read_source(source) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read {source}: {e}");
            return 1;
        }
    };

    let plan = plan_chunks(&text);
    if json {
        match serde_json::to_string_pretty(&plan) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize plan: {e}");
                return 1;
            }
        }
    } else {
        print!("{}", render_plan(&plan));
    }
    0
}

fn read_source(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(Path::new(source))
    }
}

/// Human-readable table of the plan.
pub fn render_plan(plan: &ChunkPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "words: {}  budget: {}  chunks: {}",
        plan.total_words,
        plan.budget,
        plan.len()
    );
    if plan.is_empty() {
        let _ = writeln!(out, "(blank input, nothing to summarize)");
        return out;
    }
    let _ = writeln!(
        out,
        "{:>5}  {:>6}  {:>6}  {:>7}  {:>7}",
        "chunk", "first", "words", "min_len", "max_len"
    );
    for (index, chunk) in plan.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:>6}  {:>6}  {:>7}  {:>7}",
            index, chunk.first_word, chunk.word_count, chunk.bounds.min_len, chunk.bounds.max_len
        );
    }
    out
}
