//! Backend-to-UI events and error modeling for the editor front end.

use client_core::{ClientError, ClientEvent, EditState};
use shared::{domain::Revision, protocol::Article};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Info(String),
    Alert(UiError),
    Error(UiError),
    Client(ClientEvent),
    ArticleShown(Box<Article>),
    Status {
        state: EditState,
        dirty: bool,
        rev: Option<Revision>,
    },
    LeaveBlocked(String),
    Left,
    CommandDone {
        command: &'static str,
        ok: bool,
    },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Conflict,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Server,
    Edit,
    Save,
    Admin,
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("conflict") || message_lower.contains("in progress") {
            UiErrorCategory::Conflict
        } else if message_lower.contains("invalid")
            || message_lower.contains("unknown")
            || message_lower.contains("cannot")
            || message_lower.contains("always public")
            || message_lower.contains("not open")
            || message_lower.contains("before saving")
            || message_lower.contains("no user row")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("error sending request")
            || message_lower.contains("dns")
            || message_lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        Self::from_message(context, err.to_string())
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Turns a library event into what the UI shows. Alerts become UI errors so
/// they render with a category.
pub fn from_client_event(event: ClientEvent) -> UiEvent {
    match event {
        ClientEvent::Alert(message) => {
            UiEvent::Alert(UiError::from_message(UiErrorContext::Server, message))
        }
        other => UiEvent::Client(other),
    }
}

#[cfg(test)]
#[path = "../tests/events_tests.rs"]
mod tests;
