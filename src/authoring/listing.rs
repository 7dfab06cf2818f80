//! Profile projects tab: the signed-in user's own projects

use super::error::AuthoringError;
use super::scope::EffectScope;
use crate::api::{ProjectApi, ProjectQuery};
use crate::auth::{SessionHandle, TokenNegotiator, TokenParams};
use crate::state::Project;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const LIST_FALLBACK: &str = "Unable to load projects";

/// A listing fetch detached from the loader
pub struct ListTask {
    api: Arc<dyn ProjectApi>,
    negotiator: TokenNegotiator,
    params: TokenParams,
    query: ProjectQuery,
    token: CancellationToken,
}

pub struct ListOutcome {
    token: CancellationToken,
    result: Result<Vec<Project>, String>,
}

impl ListTask {
    /// Fetch with a bearer token when one is available silently
    pub async fn run(self) -> ListOutcome {
        let bearer = self.negotiator.acquire_optional(&self.params).await;
        let result = self
            .api
            .list_projects(&self.query, bearer)
            .await
            .map_err(|err| {
                warn!("Project listing failed: {err}");
                AuthoringError::from_load(err, LIST_FALLBACK).to_string()
            });
        ListOutcome {
            token: self.token,
            result,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProjectListLoader {
    projects: Vec<Project>,
    is_loading: bool,
    error: Option<String>,
    page_size: u32,
    scope: EffectScope,
}

impl ProjectListLoader {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start fetching the current user's projects. Nothing happens without an
    /// identity session; the author filter is left off when no subject is known.
    pub fn begin(
        &mut self,
        api: Arc<dyn ProjectApi>,
        identity: &SessionHandle,
        params: TokenParams,
    ) -> Option<ListTask> {
        if !self.scope.is_live() || !identity.is_authenticated() {
            return None;
        }
        let author_id = identity.subject();
        let token = self.scope.restart();
        self.is_loading = true;
        self.error = None;
        Some(ListTask {
            api,
            negotiator: TokenNegotiator::new(identity.clone()),
            params,
            query: ProjectQuery {
                page: 0,
                limit: self.page_size,
                author_id,
            },
            token,
        })
    }

    /// Apply a finished fetch; returns false if it was superseded
    pub fn finish(&mut self, outcome: ListOutcome) -> bool {
        if outcome.token.is_cancelled() || !self.scope.is_live() {
            debug!("Dropping stale project listing");
            return false;
        }
        match outcome.result {
            Ok(projects) => self.projects = projects,
            Err(message) => self.error = Some(message),
        }
        self.is_loading = false;
        true
    }

    /// Leave the tab; in-flight fetches are discarded
    pub fn unmount(&mut self) {
        self.scope.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockProjectApi, ServerMessage};
    use crate::auth::{AccessToken, AuthError, MockIdentityProvider};
    use crate::state::{Industry, UserProfile};
    use pretty_assertions::assert_eq;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            description: "desc".into(),
            body: "<p></p>".into(),
            tags: vec![],
            industry: Industry::Tech,
            banner: String::new(),
            author_id: "auth0|alice".into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn identity(authenticated: bool) -> MockIdentityProvider {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_is_authenticated()
            .return_const(authenticated);
        provider.expect_user().returning(|| {
            Some(UserProfile {
                sub: "auth0|alice".into(),
                ..Default::default()
            })
        });
        provider
    }

    #[tokio::test]
    async fn test_lists_by_author_with_token() {
        let mut api = MockProjectApi::new();
        api.expect_list_projects()
            .withf(|query, token| {
                query.author_id.as_deref() == Some("auth0|alice")
                    && query.page == 0
                    && query.limit == 20
                    && token.as_ref().map(|t| t.secret()) == Some("tok")
            })
            .times(1)
            .returning(|_, _| Ok(vec![project("1"), project("2")]));
        let mut provider = identity(true);
        provider
            .expect_get_token_silently()
            .returning(|_| Ok(AccessToken::new("tok")));

        let mut loader = ProjectListLoader::new(20);
        let session = SessionHandle::new(Arc::new(provider));
        let task = loader
            .begin(Arc::new(api), &session, TokenParams::default())
            .unwrap();
        assert!(loader.is_loading());
        let outcome = task.run().await;
        assert!(loader.finish(outcome));

        assert_eq!(loader.projects().len(), 2);
        assert!(!loader.is_loading());
    }

    #[tokio::test]
    async fn test_token_failure_still_lists_anonymously() {
        let mut api = MockProjectApi::new();
        api.expect_list_projects()
            .withf(|_, token| token.is_none())
            .times(1)
            .returning(|_, _| Ok(vec![]));
        let mut provider = identity(true);
        provider
            .expect_get_token_silently()
            .returning(|_| Err(AuthError::LoginRequired));
        provider.expect_login_with_redirect().never();

        let mut loader = ProjectListLoader::new(20);
        let session = SessionHandle::new(Arc::new(provider));
        let task = loader
            .begin(Arc::new(api), &session, TokenParams::default())
            .unwrap();
        let outcome = task.run().await;
        loader.finish(outcome);
        assert!(loader.error().is_none());
    }

    async fn listing_error(err: ApiError) -> Option<String> {
        let mut api = MockProjectApi::new();
        api.expect_list_projects()
            .return_once(move |_, _| Err(err));
        let mut provider = identity(true);
        provider
            .expect_get_token_silently()
            .returning(|_| Ok(AccessToken::new("tok")));

        let mut loader = ProjectListLoader::new(20);
        let session = SessionHandle::new(Arc::new(provider));
        let task = loader
            .begin(Arc::new(api), &session, TokenParams::default())
            .unwrap();
        let outcome = task.run().await;
        loader.finish(outcome);
        loader.error().map(str::to_string)
    }

    #[tokio::test]
    async fn test_failure_shows_server_message() {
        let err = ApiError::Rejected {
            status: 503,
            message: Some(ServerMessage::Text("Database offline".into())),
        };
        assert_eq!(listing_error(err).await.as_deref(), Some("Database offline"));
    }

    #[tokio::test]
    async fn test_failure_shows_transport_error() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(listing_error(err).await.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let err = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(
            listing_error(err).await.as_deref(),
            Some("Unable to load projects")
        );
    }

    #[test]
    fn test_signed_out_does_not_fetch() {
        let mut api = MockProjectApi::new();
        api.expect_list_projects().never();
        let session = SessionHandle::new(Arc::new(identity(false)));
        let mut loader = ProjectListLoader::new(20);
        assert!(loader
            .begin(Arc::new(api), &session, TokenParams::default())
            .is_none());
        assert!(!loader.is_loading());
    }

    #[tokio::test]
    async fn test_result_after_unmount_is_dropped() {
        let mut api = MockProjectApi::new();
        api.expect_list_projects()
            .returning(|_, _| Ok(vec![project("1")]));
        let mut provider = identity(true);
        provider
            .expect_get_token_silently()
            .returning(|_| Ok(AccessToken::new("tok")));

        let mut loader = ProjectListLoader::new(20);
        let session = SessionHandle::new(Arc::new(provider));
        let task = loader
            .begin(Arc::new(api), &session, TokenParams::default())
            .unwrap();
        loader.unmount();
        let outcome = task.run().await;
        assert!(!loader.finish(outcome));
        assert!(loader.projects().is_empty());
    }
}
