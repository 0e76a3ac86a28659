use shared::domain::{ArticleId, AuthContext};
use tokio::sync::broadcast;
use tracing::warn;

use crate::{api::CmsApi, error::ClientError, ClientEvent};

/// Forwards an identity assertion. The page is reloaded on success so that
/// every control is rendered for the new identity.
pub async fn login(
    api: &dyn CmsApi,
    events: &broadcast::Sender<ClientEvent>,
    assertion: &str,
) -> Result<(), ClientError> {
    match api.login(assertion).await {
        Ok(()) => {
            let _ = events.send(ClientEvent::ReloadRequested);
            Ok(())
        }
        Err(err) => {
            warn!("login failed: {err}");
            let _ = events.send(ClientEvent::Alert(err.to_string()));
            Err(err)
        }
    }
}

pub async fn logout(
    api: &dyn CmsApi,
    events: &broadcast::Sender<ClientEvent>,
) -> Result<(), ClientError> {
    match api.logout().await {
        Ok(()) => {
            let _ = events.send(ClientEvent::RedirectToRoot);
            Ok(())
        }
        Err(err) => {
            warn!("logout failed: {err}");
            let _ = events.send(ClientEvent::Alert(err.to_string()));
            Err(err)
        }
    }
}

/// Controls the page offers for the given identity and article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub edit: bool,
    pub visibility: bool,
    pub admin: bool,
    pub login: bool,
    pub logout: bool,
}

impl Controls {
    pub fn for_page(auth: &AuthContext, article_id: &ArticleId) -> Self {
        Self {
            edit: auth.can_edit(),
            visibility: auth.can_edit() && auth.shows_visibility_for(article_id),
            admin: auth.can_administer(),
            login: !auth.is_signed_in(),
            logout: auth.is_signed_in(),
        }
    }
}
