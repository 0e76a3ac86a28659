use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

fn command(line: &str) -> BackendCommand {
    match parse_line(line).expect("parse") {
        ShellInput::Command(cmd) => cmd,
        other => panic!("expected a command for {line:?}, got {other:?}"),
    }
}

#[test]
fn parses_editing_commands() {
    assert_eq!(command("edit"), BackendCommand::BeginEdit);
    assert_eq!(
        command("title  Release notes "),
        BackendCommand::SetDraftTitle("Release notes".to_string())
    );
    assert_eq!(command("title"), BackendCommand::SetDraftTitle(String::new()));
    assert_eq!(
        command("append - fixed the build"),
        BackendCommand::AppendDraftMarkdown("- fixed the build".to_string())
    );
    assert_eq!(command("public on"), BackendCommand::SetPublic(true));
    assert_eq!(command("public OFF"), BackendCommand::SetPublic(false));
    assert_eq!(command("save"), BackendCommand::Save);
}

#[test]
fn quit_variants_map_to_leave() {
    assert_eq!(command("quit"), BackendCommand::Leave { force: false });
    assert_eq!(command("quit!"), BackendCommand::Leave { force: true });
}

#[test]
fn role_commands_take_email_and_role() {
    assert_eq!(
        command("role bob@x.com write"),
        BackendCommand::SelectRole {
            email: "bob@x.com".to_string(),
            role: Role::Write,
        }
    );
    assert_eq!(
        command("row carol@x.com Pending"),
        BackendCommand::AddRoleRow {
            email: "carol@x.com".to_string(),
            start_role: Role::Pending,
        }
    );
    assert!(parse_line("role bob@x.com").is_err());
    assert!(parse_line("role bob@x.com Owner").is_err());
}

#[test]
fn rejects_unknown_and_incomplete_input() {
    assert!(parse_line("publish").is_err());
    assert!(parse_line("public maybe").is_err());
    assert!(parse_line("login").is_err());
    assert!(parse_line("body").is_err());
    assert_eq!(parse_line("   ").expect("blank"), ShellInput::Empty);
    assert_eq!(parse_line("help").expect("help"), ShellInput::Help);
}

#[test]
fn body_reads_markdown_from_file() {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("guff-body-{stamp}.md"));
    fs::write(&path, "# hi there\n").expect("write");

    let cmd = command(&format!("body {}", path.display()));
    assert_eq!(cmd, BackendCommand::SetDraftMarkdown("# hi there\n".to_string()));

    let _ = fs::remove_file(&path);
    assert!(parse_line(&format!("body {}", path.display())).is_err());
}
