//! Command orchestration from UI actions to the backend command queue.

use client_core::Controls;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Rejects actions whose control the page would not have rendered for the
/// current identity. The server still authorizes every request.
pub fn check_controls(cmd: &BackendCommand, controls: &Controls) -> Result<(), String> {
    let allowed = match cmd {
        BackendCommand::BeginEdit
        | BackendCommand::SetDraftTitle(_)
        | BackendCommand::SetDraftMarkdown(_)
        | BackendCommand::AppendDraftMarkdown(_)
        | BackendCommand::Preview
        | BackendCommand::Save => controls.edit,
        BackendCommand::SetPublic(_) => controls.visibility,
        BackendCommand::AddRoleRow { .. } | BackendCommand::SelectRole { .. } => controls.admin,
        BackendCommand::Login { .. } => controls.login,
        BackendCommand::Logout => controls.logout,
        BackendCommand::Show
        | BackendCommand::Status
        | BackendCommand::Leave { .. }
        | BackendCommand::Shutdown => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(format!(
            "'{}' is not available for the current account",
            cmd.name()
        ))
    }
}

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    controls: &Controls,
    status: &mut String,
) -> bool {
    if let Err(reason) = check_controls(&cmd, controls) {
        *status = reason;
        return false;
    }

    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend command processor disconnected; restart guff".to_string();
            false
        }
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
