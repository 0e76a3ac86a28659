use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("malformed server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no article is loaded for editing")]
    NoSession,
    #[error("preview the open editor before saving")]
    EditorOpen,
    #[error("the editor is not open")]
    EditorClosed,
    #[error("a save is already in progress")]
    SaveInFlight,
    #[error("the index article is always public")]
    VisibilityLocked,
    #[error("no user row for {0}")]
    UnknownUser(String),
    #[error("this account cannot {0}")]
    NotPermitted(&'static str),
}

impl ClientError {
    /// Failures of an issued request, including a request URL that could
    /// not be built. These have already been published as alerts by the
    /// component that issued the request.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_)
                | ClientError::Api(_)
                | ClientError::Decode(_)
                | ClientError::InvalidUrl(_)
        )
    }
}
