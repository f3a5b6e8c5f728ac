#![forbid(unsafe_code)]

//! Studio wiring: owns the page, the store and every controller, and is the
//! single entry point for host events.
//!
//! Synchronous events are methods on [`Studio`]. The flows that wait on the
//! platform (generation, clipboard) are free functions over
//! `&RefCell<Studio<P>>` so no borrow is held across their await point; the
//! host keeps its event handlers free to run while a request is pending.

use std::cell::RefCell;

use time::Date;

use crate::config::StudioConfig;
use crate::export::{ClipboardError, ClipboardExporter, ClipboardSink, DownloadError, DownloadSink};
use crate::message::{MessageBus, MessageLevel, MessageTicket};
use crate::model::{GenerateRequest, PhraseRecord};
use crate::page::Page;
use crate::render::{PhraseKey, Renderer};
use crate::request::{GenerateError, GenerationTransport, RequestController, decode_response};
use crate::store::PhraseStore;
use crate::tooltip::TooltipController;

pub const VALIDATION_MESSAGE: &str = "フレーズ数は1〜100の間で指定してください";
pub const BUSY_MESSAGE: &str = "生成中です。しばらくお待ちください";
pub const GENERATION_ERROR_PREFIX: &str = "生成エラー";
pub const COPY_ONE_MESSAGE: &str = "フレーズをコピーしました";
pub const COPY_ALL_MESSAGE: &str = "全フレーズをコピーしました";
pub const COPY_FAILED_MESSAGE: &str = "コピーに失敗しました";
pub const NOTHING_TO_COPY_MESSAGE: &str = "コピーするフレーズがありません";
pub const NOTHING_TO_DOWNLOAD_MESSAGE: &str = "ダウンロードするフレーズがありません";
pub const DOWNLOADED_MESSAGE: &str = "フレーズをダウンロードしました";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "ダウンロードに失敗しました";

/// Success text for a batch of `n` phrases.
pub fn generated_message(n: usize) -> String {
    format!("{n}個のフレーズを生成しました")
}

/// Validation text for a custom count range.
fn validation_message(min: u32, max: u32) -> String {
    if (min, max) == (1, 100) {
        VALIDATION_MESSAGE.to_string()
    } else {
        format!("フレーズ数は{min}〜{max}の間で指定してください")
    }
}

pub struct Studio<P: Page> {
    page: P,
    config: StudioConfig,
    store: PhraseStore,
    messages: MessageBus,
    tooltips: TooltipController,
    renderer: Renderer,
    requests: RequestController,
    exporter: ClipboardExporter,
}

impl<P: Page> Studio<P> {
    pub fn new(page: P, config: StudioConfig) -> Self {
        Self {
            page,
            store: PhraseStore::new(),
            messages: MessageBus::new(config.message_duration()),
            tooltips: TooltipController::new(config.tooltip_gap, config.viewport_margin),
            renderer: Renderer::new(),
            requests: RequestController::new(
                config.min_count,
                config.max_count,
                config.default_count,
            ),
            exporter: ClipboardExporter::new(config.download_prefix.clone()),
            config,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &PhraseStore {
        &self.store
    }

    pub fn messages(&self) -> &MessageBus {
        &self.messages
    }

    pub fn tooltips(&self) -> &TooltipController {
        &self.tooltips
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn requests(&self) -> &RequestController {
        &self.requests
    }

    /// Show a status message.
    pub fn notify(&mut self, text: impl Into<String>, level: MessageLevel) {
        self.messages.show(&mut self.page, text, level);
    }

    /// Host timer callback for a message's auto-hide.
    pub fn expire_message(&mut self, ticket: MessageTicket) {
        self.messages.expire(&mut self.page, ticket);
    }

    /// Text of the phrase behind `key`, if the key is current.
    pub fn phrase_text(&self, key: PhraseKey) -> Option<String> {
        self.renderer
            .resolve(key, &self.store)
            .map(|p| p.text.clone())
    }

    /// Pointer entered an item's provenance trigger.
    pub fn on_source_enter(&mut self, key: PhraseKey) -> bool {
        let Some(phrase) = self.renderer.resolve(key, &self.store) else {
            tracing::debug!(?key, "hover on stale item ignored");
            return false;
        };
        let Some(anchor) = self.page.anchor_rect(key) else {
            tracing::debug!(?key, "hover anchor not in document");
            return false;
        };
        self.tooltips
            .show_hover(&mut self.page, anchor, &phrase.sources);
        true
    }

    /// Pointer left an item's provenance trigger.
    pub fn on_source_leave(&mut self) {
        self.tooltips.hide_hover(&mut self.page);
    }

    /// Provenance trigger tapped. The host must stop the event from reaching
    /// the enclosing item, whose click copies the phrase.
    pub fn on_source_tap(&mut self, key: PhraseKey) -> bool {
        let Some(phrase) = self.renderer.resolve(key, &self.store) else {
            tracing::debug!(?key, "tap on stale item ignored");
            return false;
        };
        self.tooltips.toggle_tap(&mut self.page, &phrase.sources)
    }

    /// The tap panel's close button.
    pub fn close_tap_panel(&mut self) {
        self.tooltips.close_tap(&mut self.page);
    }

    /// Close both the hover popup and the tap panel.
    pub fn dismiss_tooltips(&mut self) {
        self.tooltips.dismiss_all(&mut self.page);
    }

    fn begin_generate(&mut self, raw_count: &str) -> Result<GenerateRequest, GenerateError> {
        match self.requests.begin(raw_count) {
            Ok(request) => {
                self.page.set_loading(true);
                self.page.set_generate_enabled(false);
                tracing::info!(count = request.count, "generation requested");
                Ok(request)
            }
            Err(err) => {
                tracing::warn!(error = %err, input = raw_count, "generation refused");
                match &err {
                    GenerateError::Busy => self.notify(BUSY_MESSAGE, MessageLevel::Info),
                    _ => {
                        let text = validation_message(self.config.min_count, self.config.max_count);
                        self.notify(text, MessageLevel::Error);
                    }
                }
                Err(err)
            }
        }
    }

    fn complete_generate(
        &mut self,
        outcome: Result<Vec<PhraseRecord>, GenerateError>,
    ) -> Result<usize, GenerateError> {
        match outcome {
            Ok(phrases) => {
                let n = phrases.len();
                self.tooltips.dismiss_all(&mut self.page);
                self.store.replace(phrases);
                // Missing list hooks are logged by the renderer; the batch is
                // still stored and exportable.
                let _ = self.renderer.render(&mut self.page, &self.store);
                self.notify(generated_message(n), MessageLevel::Success);
                tracing::info!(phrases = n, "generation complete");
                Ok(n)
            }
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                self.notify(format!("{GENERATION_ERROR_PREFIX}: {err}"), MessageLevel::Error);
                Err(err)
            }
        }
    }

    fn end_generate(&mut self) {
        self.requests.finish();
        self.page.set_loading(false);
        self.page.set_generate_enabled(true);
    }

    /// Offer the current batch as a file download dated `today`.
    pub fn download_all<D: DownloadSink>(&mut self, downloads: &D, today: Date) -> Result<(), DownloadError> {
        let Ok(artifact) = self.exporter.artifact(&self.store, today) else {
            self.notify(NOTHING_TO_DOWNLOAD_MESSAGE, MessageLevel::Error);
            return Ok(());
        };
        match downloads.download(&artifact) {
            Ok(()) => {
                tracing::info!(file = %artifact.file_name, bytes = artifact.content.len(), "download started");
                self.notify(DOWNLOADED_MESSAGE, MessageLevel::Success);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "download failed");
                self.notify(DOWNLOAD_FAILED_MESSAGE, MessageLevel::Error);
                Err(err)
            }
        }
    }

    fn report_copy(&mut self, result: &Result<(), ClipboardError>, success: &str, level: MessageLevel) {
        match result {
            Ok(()) => self.notify(success, level),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.notify(COPY_FAILED_MESSAGE, MessageLevel::Error);
            }
        }
    }
}

/// Releases the in-flight slot and hides the loading indicator on every exit
/// from [`generate`], unwinding included.
struct InFlight<'a, P: Page> {
    studio: &'a RefCell<Studio<P>>,
}

impl<P: Page> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        match self.studio.try_borrow_mut() {
            Ok(mut studio) => studio.end_generate(),
            Err(_) => tracing::error!("studio borrowed at generation cleanup"),
        }
    }
}

/// Run one generation: validate `raw_count`, POST once, and on success
/// replace the store and re-render.
///
/// Every failure has already been shown to the user when this returns `Err`.
pub async fn generate<P, T>(
    studio: &RefCell<Studio<P>>,
    transport: &T,
    raw_count: &str,
) -> Result<usize, GenerateError>
where
    P: Page,
    T: GenerationTransport,
{
    let request = studio.borrow_mut().begin_generate(raw_count)?;
    let in_flight = InFlight { studio };

    let outcome = transport.post_generate(&request).await;
    if let Ok(response) = &outcome {
        tracing::debug!(status = response.status, bytes = response.body.len(), "generation response");
    }
    let decoded = decode_response(outcome);
    let result = studio.borrow_mut().complete_generate(decoded);
    drop(in_flight);
    result
}

/// Copy the phrase behind `key`. Stale keys do nothing.
pub async fn copy_one<P, C>(
    studio: &RefCell<Studio<P>>,
    clipboard: &C,
    key: PhraseKey,
) -> Result<(), ClipboardError>
where
    P: Page,
    C: ClipboardSink,
{
    let Some(text) = studio.borrow().phrase_text(key) else {
        tracing::debug!(?key, "copy on stale item ignored");
        return Ok(());
    };
    let result = clipboard.write_text(&text).await;
    studio
        .borrow_mut()
        .report_copy(&result, COPY_ONE_MESSAGE, MessageLevel::Info);
    result
}

/// Copy every phrase, newline-separated. An empty store touches no clipboard.
pub async fn copy_all<P, C>(studio: &RefCell<Studio<P>>, clipboard: &C) -> Result<(), ClipboardError>
where
    P: Page,
    C: ClipboardSink,
{
    let text = {
        let s = studio.borrow();
        s.exporter.copy_all_text(&s.store)
    };
    let Ok(text) = text else {
        studio
            .borrow_mut()
            .notify(NOTHING_TO_COPY_MESSAGE, MessageLevel::Error);
        return Ok(());
    };
    let result = clipboard.write_text(&text).await;
    studio
        .borrow_mut()
        .report_copy(&result, COPY_ALL_MESSAGE, MessageLevel::Success);
    result
}
