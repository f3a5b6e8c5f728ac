#![forbid(unsafe_code)]

//! `web-sys` implementation of [`cutup_core::Page`].
//!
//! Phrase text is always set as text content and event handlers capture the
//! item's [`PhraseKey`]; nothing is interpolated into markup.

use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use cutup_core::geometry::{Point, Rect, Size};
use cutup_core::render::SOURCE_LABEL;
use cutup_core::tooltip::{CLOSE_LABEL, TooltipContent, TooltipHandle, TooltipKind};
use cutup_core::{ElementHook, MessageLevel, MessageTicket, Page, PageError, PhraseKey, PhraseView, Studio};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement,
    ScrollBehavior, ScrollIntoViewOptions, Window,
};

use crate::platform::js_error_text;
use crate::wasm::Shell;

/// CSS class of the tap panel's close button; matched by the delegated
/// click listener.
pub(crate) const CLOSE_BUTTON_CLASS: &str = "close-tooltip";

/// An attached event listener, detached on drop.
pub(crate) struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub(crate) fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Run `f` on the studio if it is alive and not already borrowed.
pub(crate) fn with_studio(shell: &Weak<Shell>, f: impl FnOnce(&mut Studio<WebPage>)) {
    let Some(shell) = shell.upgrade() else {
        return;
    };
    match shell.studio.try_borrow_mut() {
        Ok(mut studio) => f(&mut studio),
        Err(_) => tracing::debug!("studio busy, event dropped"),
    };
}

pub(crate) struct WebPage {
    window: Window,
    document: Document,
    shell: Weak<Shell>,
    epoch: Option<u64>,
    anchors: Vec<Element>,
    item_listeners: Vec<Listener>,
    tooltips: HashMap<TooltipHandle, HtmlElement>,
    next_tooltip: u64,
}

impl WebPage {
    pub(crate) fn new(window: Window, document: Document, shell: Weak<Shell>) -> Self {
        Self {
            window,
            document,
            shell,
            epoch: None,
            anchors: Vec::new(),
            item_listeners: Vec::new(),
            tooltips: HashMap::new(),
            next_tooltip: 1,
        }
    }

    /// Element behind `hook`, logging when it is missing.
    pub(crate) fn hook(&self, hook: ElementHook) -> Option<HtmlElement> {
        let element = self
            .document
            .get_element_by_id(hook.id())
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        if element.is_none() {
            tracing::error!(hook = %hook, "element missing");
        }
        element
    }

    /// Current value of the count input; empty when the input is missing.
    pub(crate) fn count_input_value(&self) -> String {
        self.hook(ElementHook::CountInput)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn create(&self, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
        let element: HtmlElement = self.document.create_element(tag)?.dyn_into()?;
        element.set_class_name(class);
        Ok(element)
    }

    fn build_item(&mut self, view: &PhraseView) -> Result<HtmlElement, JsValue> {
        let item = self.create("div", "phrase-item")?;
        item.set_attribute("data-index", &view.key.index.to_string())?;

        let text = self.create("div", "phrase-text")?;
        text.set_text_content(Some(&view.text));
        item.append_child(&text)?;

        let sources = self.create("div", "phrase-sources")?;
        sources.set_title(&view.source_hint);
        let icon = self.create("i", "fas fa-info-circle")?;
        sources.append_child(&icon)?;
        let label = self.create("span", "source-text")?;
        label.set_text_content(Some(SOURCE_LABEL));
        sources.append_child(&label)?;
        item.append_child(&sources)?;

        let key = view.key;
        let shell = self.shell.clone();
        self.item_listeners.push(Listener::attach(&item, "click", move |_| {
            if let Some(shell) = shell.upgrade() {
                spawn_local(async move {
                    let _ = cutup_core::copy_one(&shell.studio, &shell.clipboard, key).await;
                });
            }
        })?);

        let shell = self.shell.clone();
        self.item_listeners
            .push(Listener::attach(&sources, "mouseenter", move |_| {
                with_studio(&shell, |studio| {
                    studio.on_source_enter(key);
                });
            })?);

        let shell = self.shell.clone();
        self.item_listeners
            .push(Listener::attach(&sources, "mouseleave", move |_| {
                with_studio(&shell, |studio| studio.on_source_leave());
            })?);

        let shell = self.shell.clone();
        self.item_listeners
            .push(Listener::attach(&sources, "click", move |event: Event| {
                // The item's own click copies the phrase.
                event.stop_propagation();
                with_studio(&shell, |studio| {
                    studio.on_source_tap(key);
                });
            })?);

        self.anchors.push(sources.into());
        Ok(item)
    }

    fn rebuild(&mut self, container: &HtmlElement, views: &[PhraseView]) -> Result<(), JsValue> {
        self.item_listeners.clear();
        self.anchors.clear();
        self.epoch = views.first().map(|v| v.key.epoch);
        container.set_text_content(None);
        for view in views {
            let item = self.build_item(view)?;
            container.append_child(&item)?;
        }
        Ok(())
    }

    fn build_tooltip(&self, kind: TooltipKind, content: &TooltipContent) -> Result<HtmlElement, JsValue> {
        let root = self.create("div", kind.css_class())?;
        let inner_class = match kind {
            TooltipKind::Hover => "tooltip-content",
            TooltipKind::Tap => "mobile-tooltip-content",
        };
        let inner = self.create("div", inner_class)?;

        let title = self.create("h4", "")?;
        title.set_text_content(Some(content.title));
        if content.closable {
            let header = self.create("div", "mobile-tooltip-header")?;
            header.append_child(&title)?;
            let close: HtmlButtonElement = self.create("button", CLOSE_BUTTON_CLASS)?.dyn_into()?;
            close.set_type("button");
            close.set_text_content(Some(CLOSE_LABEL));
            header.append_child(&close)?;
            inner.append_child(&header)?;
        } else {
            inner.append_child(&title)?;
        }

        for source in &content.sources {
            let row = self.create("div", "source-item")?;
            let word = self.create("span", "source-word")?;
            word.set_text_content(Some(&source.word));
            let file = self.create("span", "source-file")?;
            file.set_text_content(Some(&source.filename));
            row.append_child(&word)?;
            row.append_child(&file)?;
            inner.append_child(&row)?;
        }
        root.append_child(&inner)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&root)?;
        Ok(root)
    }
}

fn set_display(element: &HtmlElement, value: &str) {
    if let Err(err) = element.style().set_property("display", value) {
        tracing::warn!(error = %js_error_text(&err), "display not updated");
    }
}

impl Page for WebPage {
    fn set_loading(&mut self, visible: bool) {
        if let Some(loading) = self.hook(ElementHook::Loading) {
            set_display(&loading, if visible { "flex" } else { "none" });
        }
    }

    fn set_generate_enabled(&mut self, enabled: bool) {
        if let Some(button) = self
            .hook(ElementHook::GenerateButton)
            .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(!enabled);
        }
    }

    fn show_message(&mut self, text: &str, level: MessageLevel) -> Result<(), PageError> {
        let slot = self
            .hook(ElementHook::Message)
            .ok_or(PageError::HookMissing(ElementHook::Message))?;
        slot.set_text_content(Some(text));
        slot.set_class_name(&format!("message {} show", level.css_class()));
        Ok(())
    }

    fn hide_message(&mut self) {
        if let Some(slot) = self.hook(ElementHook::Message) {
            let _ = slot.class_list().remove_1("show");
        }
    }

    fn schedule_message_expiry(&mut self, ticket: MessageTicket, after: Duration) {
        let shell = self.shell.clone();
        let callback = Closure::once_into_js(move || {
            with_studio(&shell, |studio| studio.expire_message(ticket));
        });
        let millis = i32::try_from(after.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!(error = %js_error_text(&err), "message expiry not scheduled");
        }
    }

    fn alert(&mut self, text: &str) {
        let _ = self.window.alert_with_message(text);
    }

    fn render_phrases(&mut self, views: &[PhraseView]) -> Result<(), PageError> {
        let container = self
            .hook(ElementHook::PhrasesContainer)
            .ok_or(PageError::HookMissing(ElementHook::PhrasesContainer))?;
        self.hook(ElementHook::ResultsSection)
            .ok_or(PageError::HookMissing(ElementHook::ResultsSection))?;
        self.rebuild(&container, views).map_err(|err| {
            self.item_listeners.clear();
            self.anchors.clear();
            PageError::Dom(js_error_text(&err))
        })
    }

    fn reveal_results(&mut self) {
        if let Some(section) = self.hook(ElementHook::ResultsSection) {
            set_display(&section, "block");
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            section.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn anchor_rect(&self, key: PhraseKey) -> Option<Rect> {
        if self.epoch != Some(key.epoch) {
            return None;
        }
        let r = self.anchors.get(key.index)?.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.width(), r.height()))
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn mount_tooltip(&mut self, kind: TooltipKind, content: &TooltipContent) -> TooltipHandle {
        let handle = TooltipHandle(self.next_tooltip);
        self.next_tooltip += 1;
        match self.build_tooltip(kind, content) {
            Ok(element) => {
                self.tooltips.insert(handle, element);
            }
            Err(err) => tracing::error!(error = %js_error_text(&err), ?kind, "tooltip not mounted"),
        }
        handle
    }

    fn measure_tooltip(&self, handle: TooltipHandle) -> Size {
        self.tooltips.get(&handle).map_or(Size::default(), |e| {
            Size::new(f64::from(e.offset_width()), f64::from(e.offset_height()))
        })
    }

    fn place_tooltip(&mut self, handle: TooltipHandle, origin: Point) {
        let Some(element) = self.tooltips.get(&handle) else {
            return;
        };
        let style = element.style();
        let placed = style
            .set_property("left", &format!("{}px", origin.x))
            .and_then(|()| style.set_property("top", &format!("{}px", origin.y)));
        if let Err(err) = placed {
            tracing::warn!(error = %js_error_text(&err), "tooltip not placed");
        }
    }

    fn remove_tooltip(&mut self, handle: TooltipHandle) {
        if let Some(element) = self.tooltips.remove(&handle) {
            element.remove();
        }
    }
}

