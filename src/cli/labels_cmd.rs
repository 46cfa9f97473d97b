//! `labels <path>`: validate a label file and list its categories.

use std::path::Path;

use crate::engine::LabelSet;

/// Returns 0 when the file holds a usable label list, 1 otherwise.
pub fn run_labels(path: &Path) -> i32 {
    match LabelSet::from_json_file(path) {
        Ok(labels) => {
            println!("{} labels in {}", labels.len(), path.display());
            for (index, name) in labels.iter().enumerate() {
                println!("  {index:>3}  {name}");
            }
            0
        }
        Err(e) => {
            eprintln!("Invalid label file {}: {e}", path.display());
            1
        }
    }
}
