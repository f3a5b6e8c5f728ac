#![forbid(unsafe_code)]

//! Host page abstraction.
//!
//! [`Page`] is everything the core needs from the surrounding document. The
//! browser host implements it with `web-sys`; [`crate::headless::HeadlessPage`]
//! implements it in memory for tests.

use std::time::Duration;

use crate::geometry::{Point, Rect, Size};
use crate::message::{MessageLevel, MessageTicket};
use crate::render::{PhraseKey, PhraseView};
use crate::tooltip::{TooltipContent, TooltipHandle, TooltipKind};

/// Element ids the page is expected to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementHook {
    GenerateButton,
    CountInput,
    CopyAllButton,
    DownloadButton,
    PhrasesContainer,
    ResultsSection,
    Loading,
    Message,
}

impl ElementHook {
    pub const ALL: [Self; 8] = [
        Self::GenerateButton,
        Self::CountInput,
        Self::CopyAllButton,
        Self::DownloadButton,
        Self::PhrasesContainer,
        Self::ResultsSection,
        Self::Loading,
        Self::Message,
    ];

    /// DOM id of the element.
    pub const fn id(self) -> &'static str {
        match self {
            Self::GenerateButton => "generate-btn",
            Self::CountInput => "phrase-count",
            Self::CopyAllButton => "copy-all-btn",
            Self::DownloadButton => "download-btn",
            Self::PhrasesContainer => "phrases-container",
            Self::ResultsSection => "results-section",
            Self::Loading => "loading",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ElementHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.id())
    }
}

/// Page errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// A required element is not in the document.
    HookMissing(ElementHook),
    /// The host failed to build or update elements.
    Dom(String),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HookMissing(hook) => write!(f, "element {hook} not found"),
            Self::Dom(msg) => write!(f, "DOM update failed: {msg}"),
        }
    }
}

impl std::error::Error for PageError {}

/// The document surface driven by the studio.
///
/// Operations on optional chrome (loading indicator, trigger) silently do
/// nothing when their element is missing; implementations log that. Operations
/// whose caller must react return [`PageError`].
pub trait Page {
    /// Show or hide the loading indicator.
    fn set_loading(&mut self, visible: bool);

    /// Enable or disable the generation trigger.
    fn set_generate_enabled(&mut self, enabled: bool);

    /// Put `text` in the message slot and make it visible.
    fn show_message(&mut self, text: &str, level: MessageLevel) -> Result<(), PageError>;

    /// Hide the message slot.
    fn hide_message(&mut self);

    /// Arrange for the studio's `expire_message(ticket)` to run after `after`.
    fn schedule_message_expiry(&mut self, ticket: MessageTicket, after: Duration);

    /// Blocking platform alert, the last-resort message surface.
    fn alert(&mut self, text: &str);

    /// Replace the rendered phrase list with `views`, one item per view, in order.
    fn render_phrases(&mut self, views: &[PhraseView]) -> Result<(), PageError>;

    /// Make the results area visible and scroll it into view.
    fn reveal_results(&mut self);

    /// Viewport rectangle of the provenance trigger of a rendered item.
    fn anchor_rect(&self, key: PhraseKey) -> Option<Rect>;

    fn viewport_width(&self) -> f64;

    /// Append a tooltip of `kind` to the document and return its handle.
    fn mount_tooltip(&mut self, kind: TooltipKind, content: &TooltipContent) -> TooltipHandle;

    /// Post-layout size of a mounted tooltip.
    fn measure_tooltip(&self, handle: TooltipHandle) -> Size;

    fn place_tooltip(&mut self, handle: TooltipHandle, origin: Point);

    /// Remove a mounted tooltip. Unknown handles are ignored.
    fn remove_tooltip(&mut self, handle: TooltipHandle);
}
