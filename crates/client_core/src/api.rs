use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    Client, Response, StatusCode,
};
use shared::{
    domain::ArticleId,
    error::ApiError,
    protocol::{
        Article, ArticleUpdateForm, LoginForm, PutArticleResponse, RoleChangeForm,
        RoleChangeResponse,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::error::ClientError;

pub const AUTH_COOKIE: &str = "auth";

/// Request/response contract of the content server.
#[async_trait]
pub trait CmsApi: Send + Sync {
    async fn fetch_article(&self, article_id: &ArticleId) -> Result<Article, ClientError>;
    async fn render_markdown(&self, markdown: &str) -> Result<String, ClientError>;
    async fn put_article(
        &self,
        article_id: &ArticleId,
        update: &ArticleUpdateForm,
    ) -> Result<PutArticleResponse, ClientError>;
    async fn login(&self, assertion: &str) -> Result<(), ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    async fn change_role(&self, form: &RoleChangeForm) -> Result<RoleChangeResponse, ClientError>;

    /// Current value of the login cookie, if the server has set one.
    fn auth_cookie(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub auth_cookie: Option<String>,
    pub request_timeout: Option<Duration>,
}

pub struct HttpCmsApi {
    http: Client,
    base_url: Url,
    cookies: Arc<Jar>,
}

impl HttpCmsApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_options(server_url, HttpOptions::default())
    }

    pub fn with_options(server_url: &str, options: HttpOptions) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url)?;
        let cookies = Arc::new(Jar::default());
        if let Some(cookie) = options.auth_cookie.as_deref() {
            cookies.add_cookie_str(&format!("{AUTH_COOKIE}={cookie}; Path=/"), &base_url);
        }

        let mut builder = Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), status.canonical_reason(), &body).into())
}

#[async_trait]
impl CmsApi for HttpCmsApi {
    async fn fetch_article(&self, article_id: &ArticleId) -> Result<Article, ClientError> {
        let url = self.endpoint(&article_id.resource_path())?;
        debug!(article = %article_id, "fetching article");
        let response = self
            .http
            .get(url)
            .query(&[("json", "1")])
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn render_markdown(&self, markdown: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/_markdown")?)
            .body(markdown.to_string())
            .send()
            .await?;
        Ok(ensure_success(response).await?.text().await?)
    }

    async fn put_article(
        &self,
        article_id: &ArticleId,
        update: &ArticleUpdateForm,
    ) -> Result<PutArticleResponse, ClientError> {
        let url = self.endpoint(&article_id.resource_path())?;
        info!(article = %article_id, rev = %update.rev, "saving article");
        let response = self.http.put(url).form(update).send().await?;

        // A rejected revision comes back as 409 with `{"conflict":true}`.
        if response.status() == StatusCode::CONFLICT {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let body = ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn login(&self, assertion: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("/_login")?)
            .form(&LoginForm {
                assertion: assertion.to_string(),
            })
            .send()
            .await?;
        ensure_success(response).await?;
        info!("login accepted");
        Ok(())
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.endpoint("/_logout")?).send().await?;
        ensure_success(response).await?;
        info!("logged out");
        Ok(())
    }

    async fn change_role(&self, form: &RoleChangeForm) -> Result<RoleChangeResponse, ClientError> {
        info!(email = %form.email, role = %form.role, "changing user role");
        let response = self
            .http
            .post(self.endpoint("/_admin/role")?)
            .form(form)
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn auth_cookie(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(AUTH_COOKIE)?.strip_prefix('='))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
