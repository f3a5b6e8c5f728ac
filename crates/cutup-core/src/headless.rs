#![forbid(unsafe_code)]

//! In-memory host for deterministic tests and non-browser embedding.
//!
//! - [`HeadlessPage`] records everything the studio does to the page and
//!   runs message expiries off a host-advanced clock.
//! - [`ScriptedTransport`] replays queued responses and can hold a request
//!   pending until released.
//! - [`MemoryClipboard`] and [`MemoryDownloads`] capture exports.

use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use crate::export::{ClipboardError, ClipboardSink, DownloadArtifact, DownloadError, DownloadSink};
use crate::geometry::{Point, Rect, Size};
use crate::message::{MessageLevel, MessageTicket};
use crate::model::{GenerateRequest, GenerationResult, PhraseRecord};
use crate::page::{ElementHook, Page, PageError};
use crate::render::{PhraseKey, PhraseView};
use crate::request::{GenerationTransport, TransportError, TransportResponse};
use crate::studio::Studio;
use crate::tooltip::{TooltipContent, TooltipHandle, TooltipKind};

/// Monotonic clock advanced explicitly by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }
}

/// The message slot as the page shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownMessage {
    pub text: String,
    pub level: MessageLevel,
    pub visible: bool,
}

/// A tooltip currently in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedTooltip {
    pub handle: TooltipHandle,
    pub kind: TooltipKind,
    pub content: TooltipContent,
    pub size: Size,
    /// Set once the tooltip has been placed.
    pub origin: Option<Point>,
}

impl MountedTooltip {
    /// Placed bounds, if the tooltip has been positioned.
    pub fn bounds(&self) -> Option<Rect> {
        self.origin.map(|origin| Rect::from_origin(origin, self.size))
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessPage {
    missing: HashSet<ElementHook>,
    clock: DeterministicClock,
    viewport_width: f64,
    tooltip_size: Size,
    loading: bool,
    generate_enabled: bool,
    message: Option<ShownMessage>,
    expiries: BTreeMap<MessageTicket, Duration>,
    alerts: Vec<String>,
    rendered: Vec<PhraseView>,
    render_count: usize,
    reveal_count: usize,
    anchors: HashMap<usize, Rect>,
    tooltips: BTreeMap<TooltipHandle, MountedTooltip>,
    next_tooltip: u64,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;
    pub const DEFAULT_TOOLTIP_SIZE: Size = Size::new(200.0, 120.0);

    #[must_use]
    pub fn new() -> Self {
        Self {
            missing: HashSet::new(),
            clock: DeterministicClock::new(),
            viewport_width: Self::DEFAULT_VIEWPORT_WIDTH,
            tooltip_size: Self::DEFAULT_TOOLTIP_SIZE,
            loading: false,
            generate_enabled: true,
            message: None,
            expiries: BTreeMap::new(),
            alerts: Vec::new(),
            rendered: Vec::new(),
            render_count: 0,
            reveal_count: 0,
            anchors: HashMap::new(),
            tooltips: BTreeMap::new(),
            next_tooltip: 1,
        }
    }

    /// Drop an element from the document.
    #[must_use]
    pub fn without(mut self, hook: ElementHook) -> Self {
        self.missing.insert(hook);
        self
    }

    #[must_use]
    pub fn with_viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    /// Size every mounted tooltip lays out to.
    #[must_use]
    pub fn with_tooltip_size(mut self, size: Size) -> Self {
        self.tooltip_size = size;
        self
    }

    /// Override where item `index`'s provenance trigger sits.
    pub fn set_anchor(&mut self, index: usize, rect: Rect) {
        self.anchors.insert(index, rect);
    }

    fn has(&self, hook: ElementHook) -> bool {
        if self.missing.contains(&hook) {
            tracing::error!(hook = %hook, "element missing");
            false
        } else {
            true
        }
    }

    /// Advance the clock and return the message tickets that fell due.
    pub fn advance(&mut self, dt: Duration) -> Vec<MessageTicket> {
        self.clock.advance(dt);
        let now = self.clock.now();
        let due: Vec<MessageTicket> = self
            .expiries
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(ticket, _)| *ticket)
            .collect();
        for ticket in &due {
            self.expiries.remove(ticket);
        }
        due
    }

    /// Remaining delays of scheduled message expiries, in ticket order.
    pub fn pending_expiries(&self) -> Vec<Duration> {
        let now = self.clock.now();
        self.expiries
            .values()
            .map(|at| at.saturating_sub(now))
            .collect()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn generate_enabled(&self) -> bool {
        self.generate_enabled
    }

    pub fn message(&self) -> Option<&ShownMessage> {
        self.message.as_ref()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Items of the last successful render.
    pub fn rendered(&self) -> &[PhraseView] {
        &self.rendered
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn reveal_count(&self) -> usize {
        self.reveal_count
    }

    pub fn tooltips(&self) -> Vec<&MountedTooltip> {
        self.tooltips.values().collect()
    }

    pub fn tooltips_of(&self, kind: TooltipKind) -> Vec<&MountedTooltip> {
        self.tooltips.values().filter(|t| t.kind == kind).collect()
    }
}

/// Advance the page clock and run the studio's due message expiries.
pub fn advance_clock(studio: &mut Studio<HeadlessPage>, dt: Duration) {
    for ticket in studio.page_mut().advance(dt) {
        studio.expire_message(ticket);
    }
}

impl Page for HeadlessPage {
    fn set_loading(&mut self, visible: bool) {
        if self.has(ElementHook::Loading) {
            self.loading = visible;
        }
    }

    fn set_generate_enabled(&mut self, enabled: bool) {
        if self.has(ElementHook::GenerateButton) {
            self.generate_enabled = enabled;
        }
    }

    fn show_message(&mut self, text: &str, level: MessageLevel) -> Result<(), PageError> {
        if !self.has(ElementHook::Message) {
            return Err(PageError::HookMissing(ElementHook::Message));
        }
        self.message = Some(ShownMessage {
            text: text.to_string(),
            level,
            visible: true,
        });
        Ok(())
    }

    fn hide_message(&mut self) {
        if let Some(message) = &mut self.message {
            message.visible = false;
        }
    }

    fn schedule_message_expiry(&mut self, ticket: MessageTicket, after: Duration) {
        let at = self.clock.now().saturating_add(after);
        self.expiries.insert(ticket, at);
    }

    fn alert(&mut self, text: &str) {
        self.alerts.push(text.to_string());
    }

    fn render_phrases(&mut self, views: &[PhraseView]) -> Result<(), PageError> {
        for hook in [ElementHook::PhrasesContainer, ElementHook::ResultsSection] {
            if !self.has(hook) {
                return Err(PageError::HookMissing(hook));
            }
        }
        self.rendered = views.to_vec();
        self.render_count += 1;
        Ok(())
    }

    fn reveal_results(&mut self) {
        if self.has(ElementHook::ResultsSection) {
            self.reveal_count += 1;
        }
    }

    fn anchor_rect(&self, key: PhraseKey) -> Option<Rect> {
        let view = self.rendered.get(key.index)?;
        if view.key != key {
            return None;
        }
        let index = key.index;
        Some(
            self.anchors
                .get(&index)
                .copied()
                .unwrap_or_else(|| Rect::new(24.0, 160.0 + index as f64 * 48.0, 96.0, 20.0)),
        )
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn mount_tooltip(&mut self, kind: TooltipKind, content: &TooltipContent) -> TooltipHandle {
        let handle = TooltipHandle(self.next_tooltip);
        self.next_tooltip += 1;
        self.tooltips.insert(
            handle,
            MountedTooltip {
                handle,
                kind,
                content: content.clone(),
                size: self.tooltip_size,
                origin: None,
            },
        );
        handle
    }

    fn measure_tooltip(&self, handle: TooltipHandle) -> Size {
        self.tooltips
            .get(&handle)
            .map_or(Size::default(), |t| t.size)
    }

    fn place_tooltip(&mut self, handle: TooltipHandle, origin: Point) {
        if let Some(tooltip) = self.tooltips.get_mut(&handle) {
            tooltip.origin = Some(origin);
        }
    }

    fn remove_tooltip(&mut self, handle: TooltipHandle) {
        self.tooltips.remove(&handle);
    }
}

/// Transport that replays queued outcomes in order.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: RefCell<Vec<GenerateRequest>>,
    held: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: Result<TransportResponse, TransportError>) {
        self.responses.borrow_mut().push_back(outcome);
    }

    pub fn push_json(&self, status: u16, body: impl Into<String>) {
        self.push(Ok(TransportResponse::new(status, body)));
    }

    /// Queue a 200 response carrying `phrases`.
    pub fn push_phrases(&self, phrases: &[PhraseRecord]) {
        let result = GenerationResult {
            phrases: phrases.to_vec(),
            count: Some(phrases.len()),
            error: None,
        };
        let body = serde_json::to_string(&result).unwrap_or_default();
        self.push_json(200, body);
    }

    pub fn push_network_error(&self, message: impl Into<String>) {
        self.push(Err(TransportError(message.into())));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.borrow().clone()
    }

    /// Keep subsequent requests pending until [`release`](Self::release).
    pub fn hold(&self) {
        self.held.set(true);
    }

    pub fn release(&self) {
        self.held.set(false);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }
}

struct Gate<'a> {
    transport: &'a ScriptedTransport,
}

impl Future for Gate<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.transport.held.get() {
            *self.transport.waker.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

impl GenerationTransport for ScriptedTransport {
    async fn post_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.borrow_mut().push(*request);
        Gate { transport: self }.await;
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".into())))
    }
}

/// Clipboard that records writes, or rejects them.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: RefCell<Vec<String>>,
    attempts: Cell<usize>,
    deny: bool,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes are refused.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    /// Write attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl ClipboardSink for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.deny {
            return Err(ClipboardError::Denied("NotAllowedError".into()));
        }
        self.writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Download sink that records artifacts, or fails.
#[derive(Debug, Default)]
pub struct MemoryDownloads {
    artifacts: RefCell<Vec<DownloadArtifact>>,
    attempts: Cell<usize>,
    fail: bool,
}

impl MemoryDownloads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn artifacts(&self) -> Vec<DownloadArtifact> {
        self.artifacts.borrow().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl DownloadSink for MemoryDownloads {
    fn download(&self, artifact: &DownloadArtifact) -> Result<(), DownloadError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.fail {
            return Err(DownloadError::Failed("blocked".into()));
        }
        self.artifacts.borrow_mut().push(artifact.clone());
        Ok(())
    }
}
