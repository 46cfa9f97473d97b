//! Ordered category names for the multi-label classifier.
//!
//! Position `i` names classifier output dimension `i`. The set is loaded once
//! before the first classification and never changes afterwards.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::info;

/// Errors raised while loading a label file.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Failed to read label file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Label file is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label set is empty")]
    Empty,

    #[error("Duplicate label: {0}")]
    Duplicate(String),

    #[error("Blank label at index {0}")]
    Blank(usize),
}

/// Immutable, duplicate-free, ordered list of category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    pub fn new<I, S>(names: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(LabelError::Empty);
        }
        let mut seen = HashSet::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(LabelError::Blank(i));
            }
            if !seen.insert(name.as_str()) {
                return Err(LabelError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Parse a JSON array such as `["Work", "Events", "Finance"]`.
    pub fn from_json_str(json: &str) -> Result<Self, LabelError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::new(names)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LabelError> {
        let content = std::fs::read_to_string(path)?;
        let labels = Self::from_json_str(&content)?;
        info!(path = %path.display(), count = labels.len(), "loaded label classes");
        Ok(labels)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}
