use shared::domain::{ArticleId, Revision, Role};

pub mod account;
pub mod api;
pub mod edit_session;
pub mod error;
pub mod role_admin;

pub use account::{login, logout, Controls};
pub use api::{CmsApi, HttpCmsApi, HttpOptions};
pub use edit_session::{EditSession, EditState, EditorDraft, PendingSave, SaveOutcome};
pub use error::ClientError;
pub use role_admin::{RoleAdminPanel, RoleChangeOutcome, RoleRow};

pub const CONFLICT_MESSAGE: &str = "There was a conflict saving this article.";
pub const UNSAVED_CHANGES_WARNING: &str = "You have unsaved changes.";
pub const SELF_ROLE_CHANGE_MESSAGE: &str = "You cannot change your own role.";

/// What the page should show in response to a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Blocking notification with a message for the user.
    Alert(String),
    EditorOpened {
        title: String,
        markdown: String,
    },
    PreviewRendered {
        title: String,
        html: String,
    },
    Saved {
        rev: Revision,
    },
    EditStateChanged {
        article_id: ArticleId,
        state: EditState,
    },
    RoleSelectorChanged {
        email: String,
        role: Role,
    },
    ReloadRequested,
    RedirectToRoot,
}

pub fn event_channel() -> (
    tokio::sync::broadcast::Sender<ClientEvent>,
    tokio::sync::broadcast::Receiver<ClientEvent>,
) {
    tokio::sync::broadcast::channel(256)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
