use client_core::ClientEvent;
use shared::protocol::{format_display_date, parse_date, Article};

use crate::controller::events::{UiError, UiErrorCategory, UiEvent};

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Auth => "Authentication",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Conflict => "Conflict",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

fn describe_error(prefix: &str, err: &UiError) -> String {
    tracing::debug!(context = ?err.context(), category = ?err.category(), "rendering error");
    let mut text = format!("{prefix} [{}] {}", err_label(err.category()), err.message());
    if err.requires_reauth() {
        text.push_str("\n  sign in again with `login <assertion>`");
    }
    text
}

/// Full page view of an article: header, metadata, body and edit history.
pub fn describe_article(article: &Article) -> String {
    let mut lines = vec![format!("# {}", article.title)];
    let mut byline = format!("by {}", article.author);
    if let Some(created) = article.created_at() {
        byline.push_str(&format!(", {}", format_display_date(&created)));
    }
    lines.push(byline);
    if !article.history.is_empty() {
        if let Some(modified) = article.modified_at() {
            lines.push(format!("last edited {}", format_display_date(&modified)));
        }
    }
    lines.push(if article.public {
        "visibility: public".to_string()
    } else {
        "visibility: private".to_string()
    });
    lines.push(format!("revision: {}", article.rev));
    lines.push(String::new());
    lines.push(article.markdown.clone());

    if !article.history.is_empty() {
        lines.push(String::new());
        lines.push("history:".to_string());
        for item in &article.history {
            let when = parse_date(&item.date)
                .map(|date| format_display_date(&date))
                .unwrap_or_else(|| item.date.clone());
            lines.push(format!("  {when}  {} ({})", item.title, item.author));
        }
    }
    lines.join("\n")
}

/// Text for an event, or `None` for events that only drive control flow.
pub fn describe(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::Info(message) => Some(message.clone()),
        UiEvent::Alert(err) => Some(describe_error("!", err)),
        UiEvent::Error(err) => Some(describe_error("error:", err)),
        UiEvent::ArticleShown(article) => Some(describe_article(article)),
        UiEvent::Status { state, dirty, rev } => Some(format!(
            "state: {state:?}, unsaved changes: {}, revision: {}",
            if *dirty { "yes" } else { "no" },
            rev.as_ref().map(|rev| rev.as_str()).unwrap_or("-"),
        )),
        UiEvent::LeaveBlocked(warning) => Some(format!(
            "{warning} Save them, or use `quit!` to discard."
        )),
        UiEvent::Client(event) => describe_client_event(event),
        UiEvent::Left | UiEvent::CommandDone { .. } | UiEvent::Stopped => None,
    }
}

fn describe_client_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::Alert(message) => Some(format!("! {message}")),
        ClientEvent::EditorOpened { title, markdown } => {
            Some(format!("editing \"{title}\"\n---\n{markdown}\n---"))
        }
        ClientEvent::PreviewRendered { title, html } => Some(format!("# {title}\n{html}")),
        ClientEvent::Saved { rev } => Some(format!("[Saved] revision {rev}")),
        ClientEvent::EditStateChanged { article_id, state } => {
            tracing::debug!(article = %article_id, ?state, "edit state changed");
            None
        }
        ClientEvent::RoleSelectorChanged { email, role } => Some(format!("{email}: {role}")),
        ClientEvent::ReloadRequested => Some("Signed in.".to_string()),
        ClientEvent::RedirectToRoot => Some("Signed out.".to_string()),
    }
}

pub fn render(event: &UiEvent) {
    if let Some(text) = describe(event) {
        match event {
            UiEvent::Error(_) => eprintln!("{text}"),
            _ => println!("{text}"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/render_tests.rs"]
mod tests;
