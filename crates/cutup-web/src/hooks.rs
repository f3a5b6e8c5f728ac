#![forbid(unsafe_code)]

//! Global failure listeners: `window` `error`, `unhandledrejection`, and the
//! Rust panic hook.

use std::rc::Weak;

use cutup_core::error_boundary::{self, RejectionReason};
use cutup_core::MessageLevel;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ErrorEvent, Event, PromiseRejectionEvent, Window};

use crate::dom::Listener;
use crate::platform::js_message;
use crate::wasm::{Shell, active_shell};

/// Classify a rejection reason: strings and `message`-bearing objects carry
/// their text, anything else is opaque.
pub(crate) fn classify_rejection(reason: &JsValue) -> RejectionReason {
    if let Some(text) = reason.as_string() {
        return RejectionReason::Text(text);
    }
    if reason.is_object() {
        if let Some(message) = js_message(reason) {
            return RejectionReason::Message(message);
        }
    }
    RejectionReason::Opaque
}

/// Last resort when the studio cannot show a failure.
fn alert(text: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(text);
    }
}

/// Attach the `error` and `unhandledrejection` listeners to `window`.
pub(crate) fn install(window: &Window, shell: Weak<Shell>) -> Result<Vec<Listener>, JsValue> {
    let on_error = {
        let shell = shell.clone();
        Listener::attach(window, "error", move |event: Event| {
            let Some(shell) = shell.upgrade() else {
                return;
            };
            let detail = event
                .dyn_ref::<ErrorEvent>()
                .and_then(|e| js_message(&e.error()).or_else(|| Some(e.message())));
            error_boundary::report_uncaught(&shell.studio, detail.as_deref(), alert);
        })?
    };

    let on_rejection = Listener::attach(window, "unhandledrejection", move |event: Event| {
        let Some(shell) = shell.upgrade() else {
            return;
        };
        let reason = event
            .dyn_ref::<PromiseRejectionEvent>()
            .map_or(RejectionReason::Opaque, |e| classify_rejection(&e.reason()));
        error_boundary::report_rejection(&shell.studio, &reason, alert);
    })?;

    Ok(vec![on_error, on_rejection])
}

/// Route Rust panics into the message slot of the active studio, falling
/// back to `window.alert` when it cannot take the message.
pub(crate) fn install_panic_hook() {
    error_boundary::install_panic_hook(|text| {
        let shown = active_shell().is_some_and(|shell| match shell.studio.try_borrow_mut() {
            Ok(mut studio) => {
                studio.notify(text, MessageLevel::Error);
                true
            }
            Err(_) => false,
        });
        if !shown {
            alert(text);
        }
    });
}
