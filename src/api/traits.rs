//! Trait abstraction for the project API to enable mocking in tests

use super::error::ApiError;
use crate::auth::AccessToken;
use crate::state::{Project, ProjectPayload};
use async_trait::async_trait;

/// Filters for the project listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectQuery {
    pub page: u32,
    pub limit: u32,
    pub author_id: Option<String>,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            page: 0,
            limit: 20,
            author_id: None,
        }
    }
}

/// Project API operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// List projects; the bearer token is optional since reads may be public
    async fn list_projects(
        &self,
        query: &ProjectQuery,
        token: Option<AccessToken>,
    ) -> Result<Vec<Project>, ApiError>;

    /// Fetch a single project
    async fn get_project(&self, id: &str) -> Result<Project, ApiError>;

    /// Create a project, returning the persisted record
    async fn create_project(
        &self,
        payload: &ProjectPayload,
        token: AccessToken,
    ) -> Result<Project, ApiError>;

    /// Replace an existing project, returning the persisted record
    async fn update_project(
        &self,
        id: &str,
        payload: &ProjectPayload,
        token: AccessToken,
    ) -> Result<Project, ApiError>;
}
