#![forbid(unsafe_code)]

//! Provenance tooltips.
//!
//! Two independent slots: a hover popup positioned against its anchor, and a
//! tap panel with a close button. Each slot holds at most one tooltip; showing
//! a new one removes the previous one of the same kind first.
//!
//! Cross-kind policy: opening the tap panel dismisses the hover popup, while a
//! hover never touches an open tap panel. Touch browsers fire an emulated
//! pointer-enter right before the tap, so after a tap exactly one popup is
//! left and a second tap still closes the panel.

use crate::geometry::{PopupPlacement, Rect, place_popup};
use crate::model::SourceRef;
use crate::page::Page;

/// Heading shown at the top of every tooltip.
pub const TOOLTIP_TITLE: &str = "フレーズの由来";

/// Label of the tap panel's close button.
pub const CLOSE_LABEL: &str = "×";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TooltipKind {
    /// Pointer hover popup (desktop).
    Hover,
    /// Tap-toggled panel with a close affordance (touch).
    Tap,
}

impl TooltipKind {
    /// CSS class of the tooltip root element.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Hover => "tooltip",
            Self::Tap => "mobile-tooltip",
        }
    }
}

/// Host-assigned identity of a mounted tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TooltipHandle(pub u64);

/// What a tooltip lists, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    pub title: &'static str,
    pub sources: Vec<SourceRef>,
    /// Whether a close button is rendered.
    pub closable: bool,
}

impl TooltipContent {
    pub fn for_kind(kind: TooltipKind, sources: &[SourceRef]) -> Self {
        Self {
            title: TOOLTIP_TITLE,
            sources: sources.to_vec(),
            closable: kind == TooltipKind::Tap,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TooltipController {
    hover: Option<TooltipHandle>,
    tap: Option<TooltipHandle>,
    gap: f64,
    margin: f64,
}

impl TooltipController {
    #[must_use]
    pub const fn new(gap: f64, margin: f64) -> Self {
        Self {
            hover: None,
            tap: None,
            gap,
            margin,
        }
    }

    /// Show the hover popup for `sources` next to `anchor`.
    ///
    /// The popup is mounted first and measured, so placement uses its real
    /// rendered size.
    pub fn show_hover<P: Page>(
        &mut self,
        page: &mut P,
        anchor: Rect,
        sources: &[SourceRef],
    ) -> PopupPlacement {
        self.hide_hover(page);

        let content = TooltipContent::for_kind(TooltipKind::Hover, sources);
        let handle = page.mount_tooltip(TooltipKind::Hover, &content);
        let size = page.measure_tooltip(handle);
        let placement = place_popup(anchor, size, page.viewport_width(), self.gap, self.margin);
        page.place_tooltip(handle, placement.origin);
        self.hover = Some(handle);

        tracing::trace!(
            handle = handle.0,
            sources = sources.len(),
            x = placement.origin.x,
            y = placement.origin.y,
            side = ?placement.side,
            "hover tooltip shown"
        );
        placement
    }

    /// Remove the hover popup, if any.
    pub fn hide_hover<P: Page>(&mut self, page: &mut P) {
        if let Some(handle) = self.hover.take() {
            page.remove_tooltip(handle);
        }
    }

    /// Close the tap panel if open, otherwise open it for `sources`.
    ///
    /// Returns `true` when a panel was opened.
    pub fn toggle_tap<P: Page>(&mut self, page: &mut P, sources: &[SourceRef]) -> bool {
        if self.tap.is_some() {
            self.close_tap(page);
            return false;
        }

        self.hide_hover(page);
        let content = TooltipContent::for_kind(TooltipKind::Tap, sources);
        let handle = page.mount_tooltip(TooltipKind::Tap, &content);
        self.tap = Some(handle);
        tracing::trace!(handle = handle.0, sources = sources.len(), "tap panel opened");
        true
    }

    /// Remove the tap panel, if any.
    pub fn close_tap<P: Page>(&mut self, page: &mut P) {
        if let Some(handle) = self.tap.take() {
            page.remove_tooltip(handle);
        }
    }

    /// Remove both tooltips.
    pub fn dismiss_all<P: Page>(&mut self, page: &mut P) {
        self.hide_hover(page);
        self.close_tap(page);
    }

    #[must_use]
    pub const fn hover(&self) -> Option<TooltipHandle> {
        self.hover
    }

    #[must_use]
    pub const fn tap(&self) -> Option<TooltipHandle> {
        self.tap
    }
}
