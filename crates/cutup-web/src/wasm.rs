#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cutup_core::{ElementHook, Studio, StudioConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

use crate::calendar;
use crate::console::init_logging;
use crate::dom::{CLOSE_BUTTON_CLASS, Listener, WebPage, with_studio};
use crate::hooks;
use crate::platform::{BlobDownloads, FetchTransport, NavigatorClipboard};

/// Everything event handlers reach through a `Weak`.
pub(crate) struct Shell {
    pub(crate) studio: RefCell<Studio<WebPage>>,
    pub(crate) transport: FetchTransport,
    pub(crate) clipboard: NavigatorClipboard,
    pub(crate) downloads: BlobDownloads,
}

thread_local! {
    static ACTIVE: RefCell<Weak<Shell>> = const { RefCell::new(Weak::new()) };
}

/// The most recently constructed live studio, for the panic hook.
pub(crate) fn active_shell() -> Option<Rc<Shell>> {
    ACTIVE.with(|active| active.borrow().upgrade())
}

fn start_generate(shell: &Weak<Shell>) {
    let Some(shell) = shell.upgrade() else {
        return;
    };
    let raw = match shell.studio.try_borrow() {
        Ok(studio) => studio.page().count_input_value(),
        Err(_) => return,
    };
    spawn_local(async move {
        let _ = cutup_core::generate(&shell.studio, &shell.transport, &raw).await;
    });
}

fn start_copy_all(shell: &Weak<Shell>) {
    let Some(shell) = shell.upgrade() else {
        return;
    };
    spawn_local(async move {
        let _ = cutup_core::copy_all(&shell.studio, &shell.clipboard).await;
    });
}

fn run_download(shell: &Weak<Shell>) {
    let Some(shell) = shell.upgrade() else {
        return;
    };
    let today = calendar::today();
    if let Ok(mut studio) = shell.studio.try_borrow_mut() {
        let _ = studio.download_all(&shell.downloads, today);
    }
}

/// Cutup Studio bound to the current document.
///
/// Construct once the DOM is ready, then call `start()` to wire the page's
/// controls. `destroy()` detaches every listener.
#[wasm_bindgen]
pub struct CutupStudio {
    shell: Rc<Shell>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl CutupStudio {
    /// `options` is an optional JSON object overriding [`StudioConfig`]
    /// fields.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<CutupStudio, JsValue> {
        let config = match options.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => StudioConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => StudioConfig::default(),
        };
        init_logging(&config.log_filter);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let shell = Rc::new_cyclic(|weak: &Weak<Shell>| Shell {
            studio: RefCell::new(Studio::new(
                WebPage::new(window.clone(), document.clone(), weak.clone()),
                config.clone(),
            )),
            transport: FetchTransport::new(window.clone(), config.endpoint.clone()),
            clipboard: NavigatorClipboard::new(window.clone()),
            downloads: BlobDownloads::new(document.clone()),
        });
        ACTIVE.with(|active| *active.borrow_mut() = Rc::downgrade(&shell));
        hooks::install_panic_hook();

        let listeners = hooks::install(&window, Rc::downgrade(&shell))?;
        tracing::info!(endpoint = %config.endpoint, "cutup studio initialized");
        Ok(Self { shell, listeners })
    }

    /// Attach the page's control listeners. Missing controls are logged and
    /// skipped.
    pub fn start(&mut self) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.shell);
        let buttons: [(ElementHook, fn(&Weak<Shell>)); 3] = [
            (ElementHook::GenerateButton, start_generate),
            (ElementHook::CopyAllButton, start_copy_all),
            (ElementHook::DownloadButton, run_download),
        ];
        for (hook, action) in buttons {
            let element = self.shell.studio.borrow().page().hook(hook);
            let Some(element) = element else {
                continue;
            };
            let shell = weak.clone();
            self.listeners
                .push(Listener::attach(&element, "click", move |_| action(&shell))?);
        }

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let shell = weak;
        let selector = format!(".{CLOSE_BUTTON_CLASS}");
        self.listeners
            .push(Listener::attach(&document, "click", move |event: Event| {
                let closing = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|e| e.closest(&selector).ok().flatten())
                    .is_some();
                if closing {
                    with_studio(&shell, |studio| studio.close_tap_panel());
                }
            })?);
        tracing::debug!(listeners = self.listeners.len(), "controls bound");
        Ok(())
    }

    /// Generate with the current count input, as the generate button does.
    pub fn generate(&self) {
        start_generate(&Rc::downgrade(&self.shell));
    }

    #[wasm_bindgen(js_name = copyAll)]
    pub fn copy_all(&self) {
        start_copy_all(&Rc::downgrade(&self.shell));
    }

    #[wasm_bindgen(js_name = downloadAll)]
    pub fn download_all(&self) {
        run_download(&Rc::downgrade(&self.shell));
    }

    /// Number of phrases in the current batch.
    #[wasm_bindgen(js_name = phraseCount)]
    pub fn phrase_count(&self) -> usize {
        self.shell.studio.try_borrow().map_or(0, |s| s.store().len())
    }

    /// Explicit teardown for JS callers. Detaches all listeners and closes
    /// any open tooltips.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        with_studio(&Rc::downgrade(&self.shell), |studio| studio.dismiss_tooltips());
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.ptr_eq(&Rc::downgrade(&self.shell)) {
                *active = Weak::new();
            }
        });
    }
}
