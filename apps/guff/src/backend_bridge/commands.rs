//! Backend commands queued from UI to backend worker.

use shared::domain::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Show,
    BeginEdit,
    SetDraftTitle(String),
    SetDraftMarkdown(String),
    AppendDraftMarkdown(String),
    Preview,
    SetPublic(bool),
    Save,
    Status,
    Login { assertion: String },
    Logout,
    AddRoleRow { email: String, start_role: Role },
    SelectRole { email: String, role: Role },
    Leave { force: bool },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Show => "show",
            BackendCommand::BeginEdit => "edit",
            BackendCommand::SetDraftTitle(_) => "title",
            BackendCommand::SetDraftMarkdown(_) => "body",
            BackendCommand::AppendDraftMarkdown(_) => "append",
            BackendCommand::Preview => "preview",
            BackendCommand::SetPublic(_) => "public",
            BackendCommand::Save => "save",
            BackendCommand::Status => "status",
            BackendCommand::Login { .. } => "login",
            BackendCommand::Logout => "logout",
            BackendCommand::AddRoleRow { .. } => "row",
            BackendCommand::SelectRole { .. } => "role",
            BackendCommand::Leave { .. } => "quit",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
