#![forbid(unsafe_code)]

//! Wire and domain types for generated phrases.

use serde::{Deserialize, Serialize};

/// One contributing word and the document it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub word: String,
    pub filename: String,
}

impl SourceRef {
    pub fn new(word: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            filename: filename.into(),
        }
    }
}

/// A generated phrase with its ordered provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl PhraseRecord {
    pub fn new(text: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }

    /// Flattened provenance hint: `word (filename), word (filename), ...`.
    pub fn source_hint(&self) -> String {
        self.sources
            .iter()
            .map(|s| format!("{} ({})", s.word, s.filename))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub count: u32,
}

/// Decoded response of one generation request.
///
/// `phrases` is absent when the service only reports `error`; `count` is
/// informational and may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub phrases: Vec<PhraseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    /// The server-side failure message, if one was reported.
    ///
    /// An empty `error` string counts as no error.
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}
