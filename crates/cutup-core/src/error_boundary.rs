#![forbid(unsafe_code)]

//! Last-resort reporting of failures nothing else handled.
//!
//! Hosts forward uncaught errors and unhandled async rejections here, and a
//! Rust panic hook feeds panics through the same path. Local handling in the
//! request and export flows stays the primary path; this only catches what
//! slipped past it.

use std::cell::RefCell;
use std::panic::PanicHookInfo;
use std::sync::OnceLock;

use crate::message::MessageLevel;
use crate::page::Page;
use crate::studio::Studio;

/// Prefix for uncaught errors and panics.
pub const UNCAUGHT_PREFIX: &str = "予期しないエラーが発生しました";

/// Prefix for unhandled async rejections.
pub const REJECTION_PREFIX: &str = "通信エラーが発生しました";

/// Classified reason of an unhandled rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The reason was a plain string.
    Text(String),
    /// The reason was an object carrying a `message`.
    Message(String),
    /// Anything else; no detail is shown.
    Opaque,
}

/// User-facing text for an uncaught error.
pub fn uncaught_error_message(detail: Option<&str>) -> String {
    match detail.filter(|d| !d.is_empty()) {
        Some(detail) => format!("{UNCAUGHT_PREFIX}: {detail}"),
        None => UNCAUGHT_PREFIX.to_string(),
    }
}

/// User-facing text for an unhandled rejection.
pub fn rejection_message(reason: &RejectionReason) -> String {
    match reason {
        RejectionReason::Text(detail) | RejectionReason::Message(detail) if !detail.is_empty() => {
            format!("{REJECTION_PREFIX}: {detail}")
        }
        _ => REJECTION_PREFIX.to_string(),
    }
}

/// Report an uncaught error through the studio's message slot.
///
/// Never panics: when the studio is busy (the failure happened mid-update)
/// the text goes to `fallback` instead and `false` is returned.
pub fn report_uncaught<P: Page>(
    studio: &RefCell<Studio<P>>,
    detail: Option<&str>,
    fallback: impl FnOnce(&str),
) -> bool {
    let text = uncaught_error_message(detail);
    tracing::error!(detail = detail.unwrap_or(""), "uncaught error");
    deliver(studio, text, fallback)
}

/// Report an unhandled rejection through the studio's message slot, or
/// `fallback` when the studio is busy.
pub fn report_rejection<P: Page>(
    studio: &RefCell<Studio<P>>,
    reason: &RejectionReason,
    fallback: impl FnOnce(&str),
) -> bool {
    let text = rejection_message(reason);
    tracing::error!(reason = ?reason, "unhandled rejection");
    deliver(studio, text, fallback)
}

fn deliver<P: Page>(studio: &RefCell<Studio<P>>, text: String, fallback: impl FnOnce(&str)) -> bool {
    match studio.try_borrow_mut() {
        Ok(mut studio) => {
            studio.notify(text, MessageLevel::Error);
            true
        }
        Err(_) => {
            tracing::error!(%text, "studio busy, failure sent to fallback");
            fallback(&text);
            false
        }
    }
}

/// Text extracted from a panic payload.
pub fn panic_detail(info: &PanicHookInfo<'_>) -> Option<String> {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        Some((*s).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

/// Chain a panic hook that hands the user-facing text to `report`.
///
/// Installed at most once per process; later calls are ignored. The
/// previous hook still runs afterwards.
pub fn install_panic_hook<F>(report: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let detail = panic_detail(info);
            report(&uncaught_error_message(detail.as_deref()));
            previous(info);
        }));
    });
}
