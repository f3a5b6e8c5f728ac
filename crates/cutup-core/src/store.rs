#![forbid(unsafe_code)]

//! The currently displayed result batch.

use crate::model::PhraseRecord;

/// Ordered phrases of the last successful generation.
///
/// Starts empty and is only ever replaced as a whole. Writes are crate-private:
/// the request flow is the single writer, everything else reads.
#[derive(Debug, Clone, Default)]
pub struct PhraseStore {
    phrases: Vec<PhraseRecord>,
    generation: u64,
}

impl PhraseStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phrases: Vec::new(),
            generation: 0,
        }
    }

    /// Swap in a new batch. The previous batch is dropped in one step.
    pub(crate) fn replace(&mut self, phrases: Vec<PhraseRecord>) {
        self.phrases = phrases;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Read-only view of the batch in display order.
    #[must_use]
    pub fn get(&self) -> &[PhraseRecord] {
        &self.phrases
    }

    #[must_use]
    pub fn phrase(&self, index: usize) -> Option<&PhraseRecord> {
        self.phrases.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Number of batches stored so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// All phrase texts joined by `\n`, in store order.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.phrases
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
