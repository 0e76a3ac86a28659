use super::*;

use crossbeam_channel::bounded;
use shared::domain::{ArticleId, AuthContext, Role};

fn controls_for(auth: &AuthContext, article: &str) -> Controls {
    Controls::for_page(auth, &ArticleId::from(article))
}

#[test]
fn readers_cannot_queue_edits() {
    let reader = controls_for(&AuthContext::signed_in("bob@x.com", Role::Read), "notes");
    let err = check_controls(&BackendCommand::BeginEdit, &reader).expect_err("edit");
    assert_eq!(err, "'edit' is not available for the current account");
    assert!(check_controls(&BackendCommand::Show, &reader).is_ok());
    assert!(check_controls(&BackendCommand::Logout, &reader).is_ok());
}

#[test]
fn index_has_no_visibility_control() {
    let writer = AuthContext::signed_in("alice@x.com", Role::Write);
    let on_index = controls_for(&writer, "index");
    assert!(check_controls(&BackendCommand::SetPublic(false), &on_index).is_err());
    assert!(check_controls(&BackendCommand::Save, &on_index).is_ok());

    let elsewhere = controls_for(&writer, "notes");
    assert!(check_controls(&BackendCommand::SetPublic(true), &elsewhere).is_ok());
}

#[test]
fn role_table_needs_admin() {
    let role_change = BackendCommand::SelectRole {
        email: "bob@x.com".to_string(),
        role: Role::Write,
    };
    let writer = controls_for(&AuthContext::signed_in("alice@x.com", Role::Write), "index");
    assert!(check_controls(&role_change, &writer).is_err());

    let admin = controls_for(&AuthContext::signed_in("alice@x.com", Role::Admin), "index");
    assert!(check_controls(&role_change, &admin).is_ok());
}

#[test]
fn anonymous_visitors_can_only_sign_in() {
    let anonymous = controls_for(&AuthContext::anonymous(), "notes");
    let login = BackendCommand::Login {
        assertion: "a".to_string(),
    };
    assert!(check_controls(&login, &anonymous).is_ok());
    assert!(check_controls(&BackendCommand::Logout, &anonymous).is_err());
    assert!(check_controls(&BackendCommand::Save, &anonymous).is_err());
}

#[test]
fn dispatch_reports_full_and_disconnected_queues() {
    let admin = controls_for(&AuthContext::signed_in("alice@x.com", Role::Admin), "notes");
    let (cmd_tx, cmd_rx) = bounded(1);
    let mut status = String::new();

    assert!(dispatch_backend_command(
        &cmd_tx,
        BackendCommand::Status,
        &admin,
        &mut status
    ));
    assert!(!dispatch_backend_command(
        &cmd_tx,
        BackendCommand::Status,
        &admin,
        &mut status
    ));
    assert_eq!(status, "UI command queue is full; please retry");
    assert_eq!(cmd_rx.try_recv(), Ok(BackendCommand::Status));

    drop(cmd_rx);
    assert!(!dispatch_backend_command(
        &cmd_tx,
        BackendCommand::Status,
        &admin,
        &mut status
    ));
    assert!(status.contains("disconnected"));
}

#[test]
fn rejected_commands_are_not_queued() {
    let reader = controls_for(&AuthContext::signed_in("bob@x.com", Role::Read), "notes");
    let (cmd_tx, cmd_rx) = bounded(4);
    let mut status = String::new();

    assert!(!dispatch_backend_command(
        &cmd_tx,
        BackendCommand::Save,
        &reader,
        &mut status
    ));
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(status, "'save' is not available for the current account");
}
