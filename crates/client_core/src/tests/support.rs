use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use shared::{
    domain::{ArticleId, Revision},
    error::{ApiError, ErrorCode},
    protocol::{
        Article, ArticleUpdateForm, PutArticleResponse, RoleChangeForm, RoleChangeResponse,
    },
};
use tokio::sync::broadcast;

use crate::{api::CmsApi, error::ClientError, ClientEvent};

pub(crate) fn sample_article() -> Article {
    Article {
        id: ArticleId::from("a1"),
        rev: Revision::from("r1"),
        kind: "Article".to_string(),
        date: "2013-04-02T15:04:05Z".to_string(),
        title: "Hello".to_string(),
        author: "alice@x.com".to_string(),
        markdown: "# hi".to_string(),
        public: false,
        history: Vec::new(),
    }
}

pub(crate) fn saved(rev: &str) -> Result<PutArticleResponse, ApiError> {
    Ok(PutArticleResponse {
        ok: true,
        rev: Some(Revision::from(rev)),
        conflict: false,
    })
}

pub(crate) fn conflict() -> Result<PutArticleResponse, ApiError> {
    Ok(PutArticleResponse {
        ok: false,
        rev: None,
        conflict: true,
    })
}

pub(crate) fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) fn alerts(events: &[ClientEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Alert(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// In-memory stand-in for the content server.
pub(crate) struct FakeCms {
    pub article: Mutex<Option<Article>>,
    pub fetches: AtomicUsize,
    pub render_error: Mutex<Option<ApiError>>,
    pub put_responses: Mutex<VecDeque<Result<PutArticleResponse, ApiError>>>,
    pub puts: Mutex<Vec<ArticleUpdateForm>>,
    pub role_response: Mutex<Result<RoleChangeResponse, ApiError>>,
    pub role_changes: Mutex<Vec<RoleChangeForm>>,
    pub login_error: Mutex<Option<ApiError>>,
    pub assertions: Mutex<Vec<String>>,
}

impl FakeCms {
    pub(crate) fn with_article(article: Article) -> Self {
        Self {
            article: Mutex::new(Some(article)),
            fetches: AtomicUsize::new(0),
            render_error: Mutex::new(None),
            put_responses: Mutex::new(VecDeque::new()),
            puts: Mutex::new(Vec::new()),
            role_response: Mutex::new(Ok(RoleChangeResponse {
                ok: true,
                error: None,
            })),
            role_changes: Mutex::new(Vec::new()),
            login_error: Mutex::new(None),
            assertions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn empty() -> Self {
        let cms = Self::with_article(sample_article());
        *cms.article.lock().expect("lock") = None;
        cms
    }

    pub(crate) fn script_put(&self, response: Result<PutArticleResponse, ApiError>) {
        self.put_responses
            .lock()
            .expect("lock")
            .push_back(response);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn recorded_puts(&self) -> Vec<ArticleUpdateForm> {
        self.puts.lock().expect("lock").clone()
    }

    pub(crate) fn recorded_role_changes(&self) -> Vec<RoleChangeForm> {
        self.role_changes.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CmsApi for FakeCms {
    async fn fetch_article(&self, _article_id: &ArticleId) -> Result<Article, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.article
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| ApiError::from_response(403, Some("Forbidden"), "Forbidden").into())
    }

    async fn render_markdown(&self, markdown: &str) -> Result<String, ClientError> {
        if let Some(err) = self.render_error.lock().expect("lock").clone() {
            return Err(err.into());
        }
        Ok(format!("<p>{markdown}</p>"))
    }

    async fn put_article(
        &self,
        _article_id: &ArticleId,
        update: &ArticleUpdateForm,
    ) -> Result<PutArticleResponse, ClientError> {
        self.puts.lock().expect("lock").push(update.clone());
        self.put_responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::new(ErrorCode::Internal, "no scripted response")))
            .map_err(ClientError::from)
    }

    async fn login(&self, assertion: &str) -> Result<(), ClientError> {
        self.assertions
            .lock()
            .expect("lock")
            .push(assertion.to_string());
        match self.login_error.lock().expect("lock").clone() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn logout(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn change_role(&self, form: &RoleChangeForm) -> Result<RoleChangeResponse, ClientError> {
        self.role_changes.lock().expect("lock").push(form.clone());
        self.role_response
            .lock()
            .expect("lock")
            .clone()
            .map_err(ClientError::from)
    }
}
