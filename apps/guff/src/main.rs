use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::Controls;
use crossbeam_channel::{bounded, unbounded};
use shared::domain::{ArticleId, Role, INDEX_ARTICLE};
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "guff", about = "Edit articles and roles on a guff server")]
struct Cli {
    #[arg(long, global = true, default_value = "guff.toml")]
    config: PathBuf,
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Email of the signed-in user the controls are offered for.
    #[arg(long, global = true)]
    email: Option<String>,
    #[arg(long, global = true, value_parser = parse_role)]
    role: Option<Role>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an article.
    Show { path: String },
    /// Stage edits on an article, preview them and optionally save.
    Edit {
        path: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        markdown_file: Option<PathBuf>,
        #[arg(long)]
        public: Option<bool>,
        #[arg(long)]
        save: bool,
    },
    /// Interactive session on one article.
    Shell {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Change a user's role from the admin table.
    Role {
        #[arg(value_name = "EMAIL")]
        user: String,
        #[arg(value_name = "ROLE", value_parser = parse_role)]
        new_role: Role,
        /// Role the user currently has.
        #[arg(long, value_parser = parse_role, default_value = "Pending")]
        start_role: Role,
    },
    Login { assertion: String },
    Logout,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse::<Role>().map_err(|err| err.to_string())
}

fn article_id(path: &str) -> Result<ArticleId> {
    ArticleId::from_path(path).with_context(|| format!("invalid article path {path}"))
}

fn edit_script(
    title: Option<String>,
    markdown_file: Option<PathBuf>,
    public: Option<bool>,
    save: bool,
) -> Result<Vec<BackendCommand>> {
    let mut script = vec![BackendCommand::BeginEdit];
    if let Some(title) = title {
        script.push(BackendCommand::SetDraftTitle(title));
    }
    if let Some(path) = markdown_file {
        let markdown = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        script.push(BackendCommand::SetDraftMarkdown(markdown));
    }
    script.push(BackendCommand::Preview);
    if let Some(public) = public {
        script.push(BackendCommand::SetPublic(public));
    }
    if save {
        script.push(BackendCommand::Save);
    } else {
        script.push(BackendCommand::Status);
        script.push(BackendCommand::Leave { force: false });
    }
    Ok(script)
}

fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(server_url) = &cli.server_url {
        settings.server_url = server_url.clone();
    }
    if let Some(email) = &cli.email {
        settings.email = Some(email.clone());
    }
    if let Some(role) = cli.role {
        settings.role = role;
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GUFF_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    apply_cli_overrides(&mut settings, &cli);
    tracing::debug!(server = %settings.server_url, "settings loaded");

    let (article, script) = match cli.command {
        Command::Show { path } => (article_id(&path)?, Some(vec![BackendCommand::Show])),
        Command::Edit {
            path,
            title,
            markdown_file,
            public,
            save,
        } => (
            article_id(&path)?,
            Some(edit_script(title, markdown_file, public, save)?),
        ),
        Command::Shell { path } => (article_id(&path)?, None),
        Command::Role {
            user,
            new_role,
            start_role,
        } => (
            ArticleId::from(INDEX_ARTICLE),
            Some(vec![
                BackendCommand::AddRoleRow {
                    email: user.clone(),
                    start_role,
                },
                BackendCommand::SelectRole {
                    email: user,
                    role: new_role,
                },
            ]),
        ),
        Command::Login { assertion } => (
            ArticleId::from(INDEX_ARTICLE),
            Some(vec![BackendCommand::Login { assertion }]),
        ),
        Command::Logout => (
            ArticleId::from(INDEX_ARTICLE),
            Some(vec![BackendCommand::Logout]),
        ),
    };

    let controls = Controls::for_page(&settings.auth_context(), &article);
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = unbounded();
    let backend = runtime::launch(settings, article, cmd_rx, ui_tx);

    let result = match script {
        Some(script) => ui::run_script(&cmd_tx, &ui_rx, &controls, script),
        None => ui::run_interactive(&cmd_tx, &ui_rx, &controls),
    };

    drop(cmd_tx);
    backend
        .join()
        .map_err(|_| anyhow!("backend worker panicked"))?;
    result
}
