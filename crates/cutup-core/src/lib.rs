#![forbid(unsafe_code)]

//! `cutup-core` is the presentation and interaction core of Cutup Studio, a
//! client for a phrase-generation service.
//!
//! It holds the current result batch, runs the single generation request,
//! renders the phrase list, manages provenance tooltips, and exports text to
//! the clipboard or a file. Design goals:
//! - **Host-agnostic**: every platform effect goes through [`page::Page`],
//!   [`request::GenerationTransport`], [`export::ClipboardSink`] and
//!   [`export::DownloadSink`]. `cutup-web` binds these to the browser.
//! - **Deterministic**: no timers or threads of its own; the host drives
//!   time and delivers events.
//! - **Single-threaded**: shared state lives in one [`studio::Studio`] behind a
//!   `RefCell`, never borrowed across an await.

pub mod config;
pub mod error_boundary;
pub mod export;
pub mod geometry;
pub mod headless;
pub mod message;
pub mod model;
pub mod page;
pub mod render;
pub mod request;
pub mod store;
pub mod studio;
pub mod tooltip;

pub use config::{ConfigError, StudioConfig};
pub use message::{MessageLevel, MessageTicket};
pub use model::{GenerateRequest, GenerationResult, PhraseRecord, SourceRef};
pub use page::{ElementHook, Page, PageError};
pub use render::{PhraseKey, PhraseView};
pub use request::{GenerateError, GenerationTransport, TransportError, TransportResponse};
pub use store::PhraseStore;
pub use studio::{Studio, copy_all, copy_one, generate};
