use std::fs;
use std::path::PathBuf;

use reqwest::header::{AUTHORIZATION, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::BlogClientError;
use crate::models::{AuthResponse, PostDetail, PostListing, SearchListing, TaggedListing};

/// HTTP client for the blog server. Redirects are not followed: the server
/// answers successful form submissions with `303 See Other` and the target
/// tells us which post was touched.
#[derive(Clone)]
pub struct BlogClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl BlogClient {
    pub fn connect(endpoint: &str) -> Result<Self, BlogClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().redirect(Policy::none()).build()?,
            base_url,
            token: None,
            token_file: None,
        })
    }

    /// Persists tokens to `path` and picks up one saved by an earlier run.
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Ok(saved) = fs::read_to_string(&path) {
            let saved = saved.trim();
            if !saved.is_empty() {
                self.token = Some(saved.to_string());
            }
        }
        self.token_file = Some(path);
        self
    }

    pub fn set_token(&mut self, token: String) -> Result<(), BlogClientError> {
        if let Some(path) = &self.token_file {
            fs::write(path, &token)?;
        }
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, BlogClientError> {
        match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| BlogClientError::Unauthorized)?;
                Ok(req.header(AUTHORIZATION, value))
            }
            None => Ok(req),
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, BlogClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(BlogClientError::from_http_response(resp).await)
        }
    }

    /// Accepts a `303 See Other` and returns its target. A redirect to the
    /// login page means the request went out anonymously.
    async fn expect_redirect(resp: Response) -> Result<String, BlogClientError> {
        if resp.status() != StatusCode::SEE_OTHER {
            return Err(BlogClientError::from_http_response(resp).await);
        }
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if location.starts_with("/auth/login/") {
            return Err(BlogClientError::LoginRequired);
        }
        Ok(location)
    }

    async fn store_token(&mut self, resp: Response) -> Result<(), BlogClientError> {
        let auth: AuthResponse = Self::read_json(resp).await?;
        self.set_token(auth.access_token)
    }

    pub async fn register(
        &mut self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(), BlogClientError> {
        let resp = self
            .client
            .post(self.url("/auth/register/"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        self.store_token(resp).await
    }

    pub async fn login(&mut self, username: String, password: String) -> Result<(), BlogClientError> {
        let resp = self
            .client
            .post(self.url("/auth/login/"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;
        self.store_token(resp).await
    }

    pub async fn list_posts(&self) -> Result<PostListing, BlogClientError> {
        let resp = self.client.get(self.url("/")).send().await?;
        Self::read_json(resp).await
    }

    pub async fn tagged_posts(&self, slug: &str) -> Result<TaggedListing, BlogClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/tag/{}/", slug)))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    pub async fn search(&self, q: &str) -> Result<SearchListing, BlogClientError> {
        let resp = self
            .client
            .get(self.url("/search/"))
            .query(&[("q", q)])
            .send()
            .await?;
        Self::read_json(resp).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<PostDetail, BlogClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/post/{}/", id)))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        tags: &str,
    ) -> Result<Uuid, BlogClientError> {
        let req = self
            .client
            .post(self.url("/post/new/"))
            .form(&[("title", title), ("content", content), ("tags", tags)]);
        let resp = self.authorized(req)?.send().await?;
        let location = Self::expect_redirect(resp).await?;
        post_id_from_location(&location)
            .ok_or_else(|| BlogClientError::UnexpectedResponse(location))
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        tags: &str,
    ) -> Result<(), BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/post/{}/update/", id)))
            .form(&[("title", title), ("content", content), ("tags", tags)]);
        let resp = self.authorized(req)?.send().await?;
        Self::expect_redirect(resp).await.map(|_| ())
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), BlogClientError> {
        let req = self.client.post(self.url(&format!("/post/{}/delete/", id)));
        let resp = self.authorized(req)?.send().await?;
        Self::expect_redirect(resp).await.map(|_| ())
    }

    pub async fn add_comment(&self, post_id: Uuid, content: &str) -> Result<(), BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/post/{}/", post_id)))
            .form(&[("content", content)]);
        let resp = self.authorized(req)?.send().await?;
        Self::expect_redirect(resp).await.map(|_| ())
    }

    /// Returns the id of the post the comment belonged to.
    pub async fn delete_comment(&self, id: Uuid) -> Result<Uuid, BlogClientError> {
        let req = self
            .client
            .post(self.url(&format!("/comment/{}/delete/", id)));
        let resp = self.authorized(req)?.send().await?;
        let location = Self::expect_redirect(resp).await?;
        post_id_from_location(&location)
            .ok_or_else(|| BlogClientError::UnexpectedResponse(location))
    }
}

/// Extracts the id from a `/post/{id}/` location.
fn post_id_from_location(location: &str) -> Option<Uuid> {
    let id = location.strip_prefix("/post/")?.strip_suffix('/')?;
    Uuid::parse_str(id).ok()
}
