//! Edit/save workflow for a single article.
//!
//! The session keeps the last snapshot received from the server, the field
//! values it was last synced with, and an optional editor draft. The visible
//! [`EditState`] is derived from those rather than stored. Writes use the
//! server's revision token for optimistic concurrency: the server decides
//! whether a save conflicts, the client never merges.

use std::sync::Arc;

use shared::{
    domain::{ArticleFields, ArticleId, AuthContext, Revision},
    error::{ApiError, ErrorCode},
    protocol::{Article, ArticleUpdateForm, PutArticleResponse},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    api::CmsApi, error::ClientError, ClientEvent, CONFLICT_MESSAGE, UNSAVED_CHANGES_WARNING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
    Dirty,
    Saving,
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDraft {
    pub title: String,
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Revision),
    Conflict,
    Unchanged,
}

/// A write that has been started but whose response has not been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub article_id: ArticleId,
    pub update: ArticleUpdateForm,
}

pub struct EditSession {
    api: Arc<dyn CmsApi>,
    auth: AuthContext,
    article_id: ArticleId,
    article: Option<Article>,
    synced: Option<ArticleFields>,
    draft: Option<EditorDraft>,
    in_flight: Option<ArticleFields>,
    conflicted: bool,
    events: broadcast::Sender<ClientEvent>,
}

impl EditSession {
    pub fn new(
        api: Arc<dyn CmsApi>,
        auth: AuthContext,
        article_id: ArticleId,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            api,
            auth,
            article_id,
            article: None,
            synced: None,
            draft: None,
            in_flight: None,
            conflicted: false,
            events,
        }
    }

    pub fn article_id(&self) -> &ArticleId {
        &self.article_id
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn draft(&self) -> Option<&EditorDraft> {
        self.draft.as_ref()
    }

    pub fn revision(&self) -> Option<&Revision> {
        self.article.as_ref().map(|article| &article.rev)
    }

    pub fn state(&self) -> EditState {
        if self.in_flight.is_some() {
            EditState::Saving
        } else if self.draft.is_some() {
            EditState::Editing
        } else if self.is_dirty() && self.conflicted {
            EditState::Conflict
        } else if self.is_dirty() {
            EditState::Dirty
        } else {
            EditState::Viewing
        }
    }

    /// True iff title, markdown or visibility differs from the values last
    /// synced with the server.
    pub fn is_dirty(&self) -> bool {
        match (&self.article, &self.synced) {
            (Some(article), Some(synced)) => article.fields() != *synced,
            _ => false,
        }
    }

    /// Message to show when the user leaves while work could be lost.
    pub fn leave_warning(&self) -> Option<&'static str> {
        let draft_pending = match (&self.draft, &self.article) {
            (Some(draft), Some(article)) => {
                draft.title != article.title || draft.markdown != article.markdown
            }
            _ => false,
        };

        if self.is_dirty() || self.in_flight.is_some() || draft_pending {
            Some(UNSAVED_CHANGES_WARNING)
        } else {
            None
        }
    }

    /// Opens the editor, fetching the article first if no snapshot is held.
    pub async fn begin_edit(&mut self) -> Result<&EditorDraft, ClientError> {
        if !self.auth.can_edit() {
            return Err(ClientError::NotPermitted("edit articles"));
        }
        self.ensure_article().await?;
        let Some(article) = self.article.as_ref() else {
            return Err(ClientError::NoSession);
        };

        let draft = EditorDraft {
            title: article.title.clone(),
            markdown: article.markdown.clone(),
        };
        let _ = self.events.send(ClientEvent::EditorOpened {
            title: draft.title.clone(),
            markdown: draft.markdown.clone(),
        });
        self.draft = Some(draft);
        self.publish_state();
        self.draft.as_ref().ok_or(ClientError::EditorClosed)
    }

    pub fn set_draft_title(&mut self, title: impl Into<String>) -> Result<(), ClientError> {
        let draft = self.draft.as_mut().ok_or(ClientError::EditorClosed)?;
        draft.title = title.into();
        Ok(())
    }

    pub fn set_draft_markdown(&mut self, markdown: impl Into<String>) -> Result<(), ClientError> {
        let draft = self.draft.as_mut().ok_or(ClientError::EditorClosed)?;
        draft.markdown = markdown.into();
        Ok(())
    }

    /// Renders the draft and, on success, folds it into the snapshot and
    /// closes the editor. On failure the editor stays open.
    pub async fn preview(&mut self) -> Result<String, ClientError> {
        let markdown = match &self.draft {
            Some(draft) => draft.markdown.clone(),
            None => return Err(ClientError::EditorClosed),
        };

        let html = match self.api.render_markdown(&markdown).await {
            Ok(html) => html,
            Err(err) => {
                self.alert(&err);
                return Err(err);
            }
        };

        let (Some(draft), Some(article)) = (self.draft.take(), self.article.as_mut()) else {
            return Err(ClientError::NoSession);
        };

        let title = if draft.title.is_empty() {
            article.id.to_string()
        } else {
            draft.title
        };
        let mut changed = false;
        if title != article.title {
            article.title = title;
            changed = true;
        }
        if draft.markdown != article.markdown {
            article.markdown = draft.markdown;
            changed = true;
        }
        if changed {
            self.conflicted = false;
        }

        debug!(article = %self.article_id, changed, "preview reconciled");
        let _ = self.events.send(ClientEvent::PreviewRendered {
            title: article.title.clone(),
            html: html.clone(),
        });
        self.publish_state();
        Ok(html)
    }

    /// Sets the public flag. Works whether or not the editor is open.
    pub async fn set_public(&mut self, public: bool) -> Result<(), ClientError> {
        if self.article_id.is_index() {
            return Err(ClientError::VisibilityLocked);
        }
        if !self.auth.can_edit() || !self.auth.shows_visibility_for(&self.article_id) {
            return Err(ClientError::NotPermitted("change visibility"));
        }
        self.ensure_article().await?;
        let article = self.article.as_mut().ok_or(ClientError::NoSession)?;
        if article.public != public {
            article.public = public;
            self.conflicted = false;
        }
        self.publish_state();
        Ok(())
    }

    /// Submits the snapshot and applies the response in one step.
    pub async fn save(&mut self) -> Result<SaveOutcome, ClientError> {
        let Some(pending) = self.begin_save()? else {
            return Ok(SaveOutcome::Unchanged);
        };
        let result = self
            .api
            .put_article(&pending.article_id, &pending.update)
            .await;
        self.finish_save(result)
    }

    /// Marks a write as in flight and returns what must be sent, or `None`
    /// when there is nothing to save. A second call before
    /// [`finish_save`](Self::finish_save) is rejected.
    pub fn begin_save(&mut self) -> Result<Option<PendingSave>, ClientError> {
        if self.in_flight.is_some() {
            return Err(ClientError::SaveInFlight);
        }
        if self.draft.is_some() {
            return Err(ClientError::EditorOpen);
        }
        let article = self.article.as_ref().ok_or(ClientError::NoSession)?;
        if !self.is_dirty() {
            return Ok(None);
        }

        self.in_flight = Some(article.fields());
        let pending = PendingSave {
            article_id: article.id.clone(),
            update: article.to_update(),
        };
        self.publish_state();
        Ok(Some(pending))
    }

    /// Applies the server's answer to the write started by
    /// [`begin_save`](Self::begin_save). When the session was left while the
    /// write was in flight, the outcome is still reported but no snapshot is
    /// updated.
    pub fn finish_save(
        &mut self,
        result: Result<PutArticleResponse, ClientError>,
    ) -> Result<SaveOutcome, ClientError> {
        let submitted = self.in_flight.take();
        if submitted.is_none() {
            debug!(article = %self.article_id, "save finished after the session was left");
        }

        let outcome = match result {
            Ok(response) if response.conflict => {
                warn!(article = %self.article_id, "save rejected with conflict");
                self.conflicted = submitted.is_some();
                let _ = self
                    .events
                    .send(ClientEvent::Alert(CONFLICT_MESSAGE.to_string()));
                Ok(SaveOutcome::Conflict)
            }
            Ok(PutArticleResponse { rev: Some(rev), .. }) => {
                if let (Some(submitted), Some(article)) = (submitted, self.article.as_mut()) {
                    article.rev = rev.clone();
                    self.synced = Some(submitted);
                    self.conflicted = false;
                }
                info!(article = %self.article_id, rev = %rev, "article saved");
                let _ = self.events.send(ClientEvent::Saved { rev: rev.clone() });
                Ok(SaveOutcome::Saved(rev))
            }
            Ok(_) => {
                let err = ClientError::Api(ApiError::new(
                    ErrorCode::Unexpected,
                    "save response carried neither a revision nor a conflict",
                ));
                self.alert(&err);
                Err(err)
            }
            Err(err) => {
                self.alert(&err);
                Err(err)
            }
        };

        self.publish_state();
        outcome
    }

    /// Drops the session, as navigating away from the page would.
    pub fn leave(&mut self) {
        self.article = None;
        self.synced = None;
        self.draft = None;
        self.in_flight = None;
        self.conflicted = false;
        self.publish_state();
    }

    async fn ensure_article(&mut self) -> Result<(), ClientError> {
        if self.article.is_some() {
            return Ok(());
        }

        match self.api.fetch_article(&self.article_id).await {
            Ok(article) => {
                debug!(article = %article.id, rev = %article.rev, "article fetched");
                self.synced = Some(article.fields());
                self.article = Some(article);
                Ok(())
            }
            Err(err) => {
                self.alert(&err);
                Err(err)
            }
        }
    }

    fn alert(&self, err: &ClientError) {
        warn!(article = %self.article_id, "request failed: {err}");
        let _ = self.events.send(ClientEvent::Alert(err.to_string()));
    }

    fn publish_state(&self) {
        let _ = self.events.send(ClientEvent::EditStateChanged {
            article_id: self.article_id.clone(),
            state: self.state(),
        });
    }
}

#[cfg(test)]
#[path = "tests/edit_session_tests.rs"]
mod tests;
