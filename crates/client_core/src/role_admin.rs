//! User-role table of the admin page.

use std::sync::Arc;

use shared::{
    domain::{AuthContext, Role},
    protocol::RoleChangeForm,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{api::CmsApi, error::ClientError, ClientEvent, SELF_ROLE_CHANGE_MESSAGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRow {
    pub email: String,
    pub start_role: Role,
    pub selected: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChangeOutcome {
    Applied,
    /// The server refused; the selector keeps the new value.
    Refused(String),
    SelfChangeRejected,
}

pub struct RoleAdminPanel {
    api: Arc<dyn CmsApi>,
    auth: AuthContext,
    rows: Vec<RoleRow>,
    events: broadcast::Sender<ClientEvent>,
}

impl RoleAdminPanel {
    pub fn new(
        api: Arc<dyn CmsApi>,
        auth: AuthContext,
        rows: impl IntoIterator<Item = (String, Role)>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|(email, start_role)| RoleRow {
                email,
                start_role,
                selected: start_role,
            })
            .collect();
        Self {
            api,
            auth,
            rows,
            events,
        }
    }

    pub fn rows(&self) -> &[RoleRow] {
        &self.rows
    }

    pub fn row(&self, email: &str) -> Option<&RoleRow> {
        self.rows.iter().find(|row| row.email == email)
    }

    /// Adds a user row as the server would have rendered it. An existing row
    /// for the same email is reset to the given role.
    pub fn add_row(&mut self, email: impl Into<String>, start_role: Role) {
        let email = email.into();
        match self.rows.iter_mut().find(|row| row.email == email) {
            Some(row) => {
                row.start_role = start_role;
                row.selected = start_role;
            }
            None => self.rows.push(RoleRow {
                email,
                start_role,
                selected: start_role,
            }),
        }
    }

    /// Handles a click on a role selector. Changes to the acting user's own
    /// row never reach the server.
    pub async fn select_role(
        &mut self,
        email: &str,
        role: Role,
    ) -> Result<RoleChangeOutcome, ClientError> {
        let is_self = self.auth.is_self(email);
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.email == email)
            .ok_or_else(|| ClientError::UnknownUser(email.to_string()))?;

        if is_self {
            row.selected = row.start_role;
            let restored = row.start_role;
            let _ = self
                .events
                .send(ClientEvent::Alert(SELF_ROLE_CHANGE_MESSAGE.to_string()));
            let _ = self.events.send(ClientEvent::RoleSelectorChanged {
                email: email.to_string(),
                role: restored,
            });
            return Ok(RoleChangeOutcome::SelfChangeRejected);
        }

        row.selected = role;
        let _ = self.events.send(ClientEvent::RoleSelectorChanged {
            email: email.to_string(),
            role,
        });

        let form = RoleChangeForm {
            email: email.to_string(),
            role,
        };
        match self.api.change_role(&form).await {
            Ok(response) if response.ok => {
                info!(email, %role, "role updated");
                Ok(RoleChangeOutcome::Applied)
            }
            Ok(response) => {
                let message = response.error.unwrap_or_default();
                warn!(email, %role, "role change refused: {message}");
                let _ = self.events.send(ClientEvent::Alert(message.clone()));
                Ok(RoleChangeOutcome::Refused(message))
            }
            Err(err) => {
                warn!(email, %role, "role change failed: {err}");
                let _ = self.events.send(ClientEvent::Alert(err.to_string()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/role_admin_tests.rs"]
mod tests;
