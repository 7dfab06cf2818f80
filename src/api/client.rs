//! HTTP client for the project API
//!
//! Speaks the JSON REST contract: `GET /projects`, `GET /projects/:id`,
//! `POST /projects` and `PUT /projects/:id`.

use super::error::{ApiError, ErrorBody};
use super::traits::{ProjectApi, ProjectQuery};
use crate::auth::AccessToken;
use crate::state::{Project, ProjectPayload};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Default API address
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// `{ data: Project[] }` envelope returned by the listing endpoint
#[derive(Debug, Deserialize)]
struct ProjectPage {
    #[serde(default)]
    data: Vec<Project>,
}

/// Client for the project REST API
#[derive(Debug, Clone)]
pub struct HttpProjectClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProjectClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, token: Option<&AccessToken>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.secret()),
            None => request,
        }
    }

    /// Turn a non-2xx response into an error, reading `{message}` if possible
    async fn rejection(response: Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        debug!("API rejected request with {status}: {message:?}");
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn read_project(response: Response) -> Result<Project, ApiError> {
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json::<Project>().await?)
    }
}

#[async_trait]
impl ProjectApi for HttpProjectClient {
    async fn list_projects(
        &self,
        query: &ProjectQuery,
        token: Option<AccessToken>,
    ) -> Result<Vec<Project>, ApiError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(author) = &query.author_id {
            params.push(("authorId", author.clone()));
        }

        let request = self.http.get(self.url("/projects")).query(&params);
        let response = Self::authorize(request, token.as_ref()).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let page = response.json::<ProjectPage>().await?;
        Ok(page.data)
    }

    async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/projects/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .map(|m| m.alert_text())
                .unwrap_or_else(|| "Project not found.".to_string());
            return Err(ApiError::NotFound(message));
        }
        Self::read_project(response).await
    }

    async fn create_project(
        &self,
        payload: &ProjectPayload,
        token: AccessToken,
    ) -> Result<Project, ApiError> {
        let request = self.http.post(self.url("/projects")).json(payload);
        let response = Self::authorize(request, Some(&token)).send().await?;
        Self::read_project(response).await
    }

    async fn update_project(
        &self,
        id: &str,
        payload: &ProjectPayload,
        token: AccessToken,
    ) -> Result<Project, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/projects/{id}")))
            .json(payload);
        let response = Self::authorize(request, Some(&token)).send().await?;
        Self::read_project(response).await
    }
}
