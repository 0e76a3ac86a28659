//! Backend worker: owns the edit session and role table, runs requests on a
//! tokio runtime, and reports back to the UI thread.

use std::{sync::Arc, thread};

use client_core::{
    event_channel, ClientError, ClientEvent, CmsApi, EditSession, HttpCmsApi, RoleAdminPanel,
};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::{ArticleId, AuthContext, INDEX_ARTICLE};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

use crate::{
    backend_bridge::commands::BackendCommand,
    config::Settings,
    controller::events::{from_client_event, UiError, UiErrorContext, UiEvent},
};

pub fn launch(
    settings: Settings,
    article_id: ArticleId,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::Stopped);
                return;
            }
        };

        runtime.block_on(run(settings, article_id, cmd_rx, ui_tx.clone()));
        let _ = ui_tx.send(UiEvent::Stopped);
    })
}

async fn run(
    settings: Settings,
    article_id: ArticleId,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let (events, event_rx) = event_channel();
    let forwarder = tokio::spawn(forward_client_events(event_rx, ui_tx.clone()));

    match Backend::new(&settings, article_id, events, ui_tx.clone()) {
        Ok(mut backend) => backend.serve(&cmd_rx).await,
        Err(err) => {
            tracing::error!("backend worker startup failure: {err}");
            let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err}"),
            )));
        }
    }

    // Every event sender is gone now; the forwarder drains what is left.
    let _ = forwarder.await;
}

async fn forward_client_events(mut rx: broadcast::Receiver<ClientEvent>, ui_tx: Sender<UiEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if ui_tx.send(from_client_event(event)).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "ui fell behind client events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

struct Backend {
    api: Arc<dyn CmsApi>,
    auth: AuthContext,
    events: broadcast::Sender<ClientEvent>,
    session: Arc<Mutex<EditSession>>,
    roles: RoleAdminPanel,
    saves: Vec<JoinHandle<()>>,
    ui_tx: Sender<UiEvent>,
}

impl Backend {
    fn new(
        settings: &Settings,
        article_id: ArticleId,
        events: broadcast::Sender<ClientEvent>,
        ui_tx: Sender<UiEvent>,
    ) -> Result<Self, ClientError> {
        let api = HttpCmsApi::with_options(&settings.server_url, settings.http_options())?;
        tracing::info!(server = %api.base_url(), "backend worker ready");
        Ok(Self::with_api(
            Arc::new(api),
            settings.auth_context(),
            article_id,
            events,
            ui_tx,
        ))
    }

    fn with_api(
        api: Arc<dyn CmsApi>,
        auth: AuthContext,
        article_id: ArticleId,
        events: broadcast::Sender<ClientEvent>,
        ui_tx: Sender<UiEvent>,
    ) -> Self {
        let session = EditSession::new(api.clone(), auth.clone(), article_id, events.clone());
        let roles = RoleAdminPanel::new(api.clone(), auth.clone(), Vec::new(), events.clone());
        Self {
            api,
            auth,
            events,
            session: Arc::new(Mutex::new(session)),
            roles,
            saves: Vec::new(),
            ui_tx,
        }
    }

    async fn serve(&mut self, cmd_rx: &Receiver<BackendCommand>) {
        while let Ok(cmd) = cmd_rx.recv() {
            if cmd == BackendCommand::Shutdown {
                break;
            }
            let command = cmd.name();
            let ok = self.handle(cmd).await;
            self.send(UiEvent::CommandDone { command, ok });
        }

        self.wait_for_saves().await;
    }

    async fn wait_for_saves(&mut self) {
        for save in self.saves.drain(..) {
            let _ = save.await;
        }
    }

    async fn handle(&mut self, cmd: BackendCommand) -> bool {
        match cmd {
            BackendCommand::Show => {
                let article_id = self.session.lock().await.article_id().clone();
                match self.api.fetch_article(&article_id).await {
                    Ok(article) => {
                        self.send(UiEvent::ArticleShown(Box::new(article)));
                        true
                    }
                    Err(err) => {
                        let _ = self.events.send(ClientEvent::Alert(err.to_string()));
                        false
                    }
                }
            }
            BackendCommand::BeginEdit => {
                let mut session = self.session.lock().await;
                let result = session.begin_edit().await.map(|_| ());
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::SetDraftTitle(title) => {
                let result = self.session.lock().await.set_draft_title(title);
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::SetDraftMarkdown(markdown) => {
                let result = self.session.lock().await.set_draft_markdown(markdown);
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::AppendDraftMarkdown(line) => {
                let mut session = self.session.lock().await;
                let result = match session.draft() {
                    Some(draft) => {
                        let markdown = format!("{}{line}\n", draft.markdown);
                        session.set_draft_markdown(markdown)
                    }
                    None => Err(ClientError::EditorClosed),
                };
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::Preview => {
                let result = self.session.lock().await.preview().await.map(|_| ());
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::SetPublic(public) => {
                let result = self.session.lock().await.set_public(public).await;
                self.report(UiErrorContext::Edit, result)
            }
            BackendCommand::Save => self.start_save().await,
            BackendCommand::Status => {
                let session = self.session.lock().await;
                self.send(UiEvent::Status {
                    state: session.state(),
                    dirty: session.is_dirty(),
                    rev: session.revision().cloned(),
                });
                true
            }
            BackendCommand::Login { assertion } => {
                if self.blocked_by_unsaved_work().await {
                    return false;
                }
                let result =
                    client_core::login(self.api.as_ref(), &self.events, &assertion).await;
                if result.is_ok() {
                    self.session.lock().await.leave();
                    if let Some(cookie) = self.api.auth_cookie() {
                        self.send(UiEvent::Info(format!(
                            "login cookie: {cookie} (set GUFF_AUTH_COOKIE to reuse it)"
                        )));
                    }
                }
                self.report(UiErrorContext::Login, result)
            }
            BackendCommand::Logout => {
                if self.blocked_by_unsaved_work().await {
                    return false;
                }
                let result = client_core::logout(self.api.as_ref(), &self.events).await;
                if result.is_ok() {
                    let mut session = self.session.lock().await;
                    session.leave();
                    *session = EditSession::new(
                        self.api.clone(),
                        self.auth.clone(),
                        ArticleId::from(INDEX_ARTICLE),
                        self.events.clone(),
                    );
                }
                self.report(UiErrorContext::Login, result)
            }
            BackendCommand::AddRoleRow { email, start_role } => {
                self.roles.add_row(email, start_role);
                true
            }
            BackendCommand::SelectRole { email, role } => {
                let result = self.roles.select_role(&email, role).await.map(|_| ());
                self.report(UiErrorContext::Admin, result)
            }
            BackendCommand::Leave { force } => {
                // A write already sent still reports its answer before leaving.
                self.wait_for_saves().await;
                let mut session = self.session.lock().await;
                if !force {
                    if let Some(warning) = session.leave_warning() {
                        self.send(UiEvent::LeaveBlocked(warning.to_string()));
                        return true;
                    }
                }
                session.leave();
                self.send(UiEvent::Left);
                true
            }
            BackendCommand::Shutdown => true,
        }
    }

    /// Starts a write without blocking the command loop. The session guard
    /// rejects a second save until this one has been applied.
    async fn start_save(&mut self) -> bool {
        let pending = self.session.lock().await.begin_save();
        match pending {
            Ok(Some(pending)) => {
                let api = Arc::clone(&self.api);
                let session = Arc::clone(&self.session);
                self.saves.retain(|save| !save.is_finished());
                self.saves.push(tokio::spawn(async move {
                    let result = api.put_article(&pending.article_id, &pending.update).await;
                    // Failures are published as alerts by the session.
                    let _ = session.lock().await.finish_save(result);
                }));
                true
            }
            Ok(None) => {
                self.send(UiEvent::Info("Nothing to save.".to_string()));
                true
            }
            Err(err) => self.report(UiErrorContext::Save, Err(err)),
        }
    }

    async fn blocked_by_unsaved_work(&self) -> bool {
        match self.session.lock().await.leave_warning() {
            Some(warning) => {
                self.send(UiEvent::LeaveBlocked(warning.to_string()));
                true
            }
            None => false,
        }
    }

    fn report(&self, context: UiErrorContext, result: Result<(), ClientError>) -> bool {
        match result {
            Ok(()) => true,
            // Already published as an alert.
            Err(err) if err.is_remote() => false,
            Err(err) => {
                self.send(UiEvent::Error(UiError::from_client_error(context, &err)));
                false
            }
        }
    }

    fn send(&self, event: UiEvent) {
        let _ = self.ui_tx.send(event);
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
