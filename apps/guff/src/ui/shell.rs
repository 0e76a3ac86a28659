//! Line-oriented shell and one-shot command runner.

use std::{
    fs,
    io::{self, BufRead, Write},
    thread,
};

use anyhow::{anyhow, bail, Result};
use client_core::Controls;
use crossbeam_channel::{never, select, unbounded, Receiver, Sender};
use shared::domain::Role;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{events::UiEvent, orchestration::dispatch_backend_command},
    ui::render::render,
};

pub const HELP: &str = "\
commands:
  show                    print the article
  edit                    open the editor
  title <text>            set the draft title
  body <file>             replace the draft body with a file's contents
  append <text>           append a line to the draft body
  preview                 render the draft and close the editor
  public on|off           change visibility
  save                    write changes to the server
  status                  print the edit state
  login <assertion>       sign in
  logout                  sign out
  row <email> <role>      add a user row to the role table
  role <email> <role>     change a user's role
  quit                    leave (refused while changes are unsaved)
  quit!                   leave and discard unsaved changes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Command(BackendCommand),
    Help,
    Empty,
}

fn parse_public(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "public" => Ok(true),
        "off" | "false" | "no" | "private" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}

fn split_user_role(rest: &str) -> Result<(String, Role)> {
    let mut parts = rest.split_whitespace();
    let (Some(email), Some(role), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected <email> <role>");
    };
    let role = role.parse::<Role>().map_err(|err| anyhow!("{err}"))?;
    Ok((email.to_string(), role))
}

fn required<'a>(rest: &'a str, what: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("missing {what}");
    }
    Ok(rest)
}

/// Parses one shell line. `body` reads its file here so the backend only
/// ever sees text.
pub fn parse_line(line: &str) -> Result<ShellInput> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellInput::Empty);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word {
        "help" | "?" => return Ok(ShellInput::Help),
        "show" => BackendCommand::Show,
        "edit" => BackendCommand::BeginEdit,
        // An empty title is allowed; the article id is used instead.
        "title" => BackendCommand::SetDraftTitle(rest.to_string()),
        "body" => {
            let path = required(rest, "file path")?;
            let markdown =
                fs::read_to_string(path).map_err(|err| anyhow!("cannot read {path}: {err}"))?;
            BackendCommand::SetDraftMarkdown(markdown)
        }
        "append" => BackendCommand::AppendDraftMarkdown(rest.to_string()),
        "preview" => BackendCommand::Preview,
        "public" => BackendCommand::SetPublic(parse_public(required(rest, "on or off")?)?),
        "save" => BackendCommand::Save,
        "status" => BackendCommand::Status,
        "login" => BackendCommand::Login {
            assertion: required(rest, "assertion")?.to_string(),
        },
        "logout" => BackendCommand::Logout,
        "row" => {
            let (email, start_role) = split_user_role(rest)?;
            BackendCommand::AddRoleRow { email, start_role }
        }
        "role" => {
            let (email, role) = split_user_role(rest)?;
            BackendCommand::SelectRole { email, role }
        }
        "quit" | "exit" => BackendCommand::Leave { force: false },
        "quit!" | "exit!" => BackendCommand::Leave { force: true },
        other => bail!("unknown command '{other}' (try `help`)"),
    };
    Ok(ShellInput::Command(cmd))
}

fn prompt() {
    print!("guff> ");
    let _ = io::stdout().flush();
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (line_tx, line_rx) = unbounded();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });
    line_rx
}

/// Runs the interactive shell until the backend stops.
pub fn run_interactive(
    cmd_tx: &Sender<BackendCommand>,
    ui_rx: &Receiver<UiEvent>,
    controls: &Controls,
) -> Result<()> {
    let mut status = String::new();
    let lines = spawn_stdin_reader();
    let mut input_open = true;
    println!("{HELP}");
    prompt();

    loop {
        let input = if input_open { lines.clone() } else { never() };
        select! {
            recv(ui_rx) -> event => {
                let Ok(event) = event else { break };
                render(&event);
                match event {
                    UiEvent::Stopped => break,
                    UiEvent::Left => {
                        dispatch_backend_command(cmd_tx, BackendCommand::Shutdown, controls, &mut status);
                    }
                    UiEvent::CommandDone { .. } => prompt(),
                    _ => {}
                }
            }
            recv(input) -> line => {
                let Ok(line) = line else {
                    // End of input: leave without prompting about unsaved work.
                    input_open = false;
                    dispatch_backend_command(cmd_tx, BackendCommand::Leave { force: true }, controls, &mut status);
                    continue;
                };
                match parse_line(&line) {
                    Ok(ShellInput::Command(cmd)) => {
                        if !dispatch_backend_command(cmd_tx, cmd, controls, &mut status) {
                            println!("{status}");
                            prompt();
                        }
                    }
                    Ok(ShellInput::Help) => {
                        println!("{HELP}");
                        prompt();
                    }
                    Ok(ShellInput::Empty) => prompt(),
                    Err(err) => {
                        println!("{err}");
                        prompt();
                    }
                }
            }
        }
    }
    Ok(())
}

/// Sends each command in turn, waiting for the backend to finish it, and
/// stops at the first failure. The backend is shut down either way. Alerts
/// raised after a command returned, such as a conflicted save, still fail
/// the run.
pub fn run_script(
    cmd_tx: &Sender<BackendCommand>,
    ui_rx: &Receiver<UiEvent>,
    controls: &Controls,
    script: Vec<BackendCommand>,
) -> Result<()> {
    let mut status = String::new();
    let mut alerted = false;
    let mut failure = None;

    for cmd in script {
        let name = cmd.name();
        if !dispatch_backend_command(cmd_tx, cmd, controls, &mut status) {
            failure = Some(status.clone());
            break;
        }
        if !wait_for_completion(ui_rx, &mut alerted)? {
            failure = Some(format!("'{name}' failed"));
            break;
        }
    }

    dispatch_backend_command(cmd_tx, BackendCommand::Shutdown, controls, &mut status);
    for event in ui_rx.iter() {
        observe(&event, &mut alerted);
        if matches!(event, UiEvent::Stopped) {
            break;
        }
    }

    if let Some(reason) = failure {
        return Err(anyhow!(reason));
    }
    if alerted {
        bail!("the server reported an error");
    }
    Ok(())
}

fn observe(event: &UiEvent, alerted: &mut bool) {
    if matches!(event, UiEvent::Alert(_) | UiEvent::Error(_)) {
        *alerted = true;
    }
    render(event);
}

fn wait_for_completion(ui_rx: &Receiver<UiEvent>, alerted: &mut bool) -> Result<bool> {
    for event in ui_rx.iter() {
        observe(&event, alerted);
        match event {
            UiEvent::CommandDone { ok, .. } => return Ok(ok),
            UiEvent::Stopped => bail!("backend stopped unexpectedly"),
            _ => {}
        }
    }
    bail!("backend disconnected")
}

#[cfg(test)]
#[path = "../tests/shell_tests.rs"]
mod tests;
