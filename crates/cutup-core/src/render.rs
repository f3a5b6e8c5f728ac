#![forbid(unsafe_code)]

//! Phrase list rendering.
//!
//! Every render produces one [`PhraseView`] per stored phrase and stamps it
//! with a [`PhraseKey`]: the render epoch plus the phrase's store index. Host
//! event handlers carry the key back, and [`Renderer::resolve`] only accepts
//! keys from the latest render. Bindings from an earlier render therefore go
//! inert on their own when the list is rebuilt.

use crate::model::{PhraseRecord, SourceRef};
use crate::page::{Page, PageError};
use crate::store::PhraseStore;

/// Label of each item's provenance trigger.
pub const SOURCE_LABEL: &str = "由来を表示";

/// Identity of one rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhraseKey {
    pub epoch: u64,
    pub index: usize,
}

/// View model of one rendered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseView {
    pub key: PhraseKey,
    /// Phrase text, rendered as text content (never as markup).
    pub text: String,
    /// Passive hint for the trigger's `title`.
    pub source_hint: String,
    pub sources: Vec<SourceRef>,
}

impl PhraseView {
    fn new(key: PhraseKey, phrase: &PhraseRecord) -> Self {
        Self {
            key,
            text: phrase.text.clone(),
            source_hint: phrase.source_hint(),
            sources: phrase.sources.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    epoch: u64,
    rendered: usize,
}

impl Renderer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            epoch: 0,
            rendered: 0,
        }
    }

    /// Start a new epoch and build views for the whole store.
    pub fn build(&mut self, store: &PhraseStore) -> Vec<PhraseView> {
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;
        let views: Vec<PhraseView> = store
            .get()
            .iter()
            .enumerate()
            .map(|(index, phrase)| PhraseView::new(PhraseKey { epoch, index }, phrase))
            .collect();
        self.rendered = views.len();
        views
    }

    /// Rebuild the page's phrase list from `store` and reveal it.
    ///
    /// The epoch advances even when the page rejects the list, so no key
    /// from before this call resolves afterwards.
    pub fn render<P: Page>(&mut self, page: &mut P, store: &PhraseStore) -> Result<usize, PageError> {
        let views = self.build(store);
        if let Err(err) = page.render_phrases(&views) {
            self.rendered = 0;
            tracing::error!(error = %err, "phrase list not rendered");
            return Err(err);
        }
        page.reveal_results();
        tracing::debug!(epoch = self.epoch, items = views.len(), "phrases rendered");
        Ok(views.len())
    }

    /// Look up the phrase behind `key`, if the key belongs to the current render.
    #[must_use]
    pub fn resolve<'s>(&self, key: PhraseKey, store: &'s PhraseStore) -> Option<&'s PhraseRecord> {
        if key.epoch != self.epoch || key.index >= self.rendered {
            return None;
        }
        store.phrase(key.index)
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}
