#![forbid(unsafe_code)]

//! Single-slot transient status messages.
//!
//! A new message replaces whatever is showing. Each message schedules its own
//! expiry; an expiry that belongs to a replaced message is ignored so the
//! newer text keeps its full display time.

use std::time::Duration;

use crate::page::Page;

/// Message severity. Maps to the slot's CSS modifier class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLevel {
    #[default]
    Info,
    Success,
    Error,
}

impl MessageLevel {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Identifies one shown message for its expiry callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTicket(pub u64);

/// The message currently in the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
    pub ticket: MessageTicket,
}

#[derive(Debug, Clone)]
pub struct MessageBus {
    current: Option<Message>,
    next_ticket: u64,
    duration: Duration,
}

impl MessageBus {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            current: None,
            next_ticket: 1,
            duration,
        }
    }

    /// Show `text` at `level`, replacing the current message.
    ///
    /// Falls back to the page's blocking alert when the slot is missing.
    pub fn show<P: Page>(&mut self, page: &mut P, text: impl Into<String>, level: MessageLevel) {
        let text = text.into();
        match page.show_message(&text, level) {
            Ok(()) => {
                let ticket = MessageTicket(self.next_ticket);
                self.next_ticket = self.next_ticket.wrapping_add(1);
                tracing::debug!(ticket = ticket.0, level = level.css_class(), %text, "message shown");
                page.schedule_message_expiry(ticket, self.duration);
                self.current = Some(Message {
                    text,
                    level,
                    ticket,
                });
            }
            Err(err) => {
                tracing::error!(error = %err, %text, "message slot unavailable, alerting");
                self.current = None;
                page.alert(&text);
            }
        }
    }

    /// Hide the message identified by `ticket` if it is still showing.
    ///
    /// Returns `true` when the slot was hidden.
    pub fn expire<P: Page>(&mut self, page: &mut P, ticket: MessageTicket) -> bool {
        match &self.current {
            Some(message) if message.ticket == ticket => {
                page.hide_message();
                self.current = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}
