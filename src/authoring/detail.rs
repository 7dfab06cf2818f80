//! Read-only project page

use super::error::AuthoringError;
use super::scope::EffectScope;
use crate::api::ProjectApi;
use crate::state::Project;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DETAIL_FALLBACK: &str = "Unable to load project.";

pub struct DetailTask {
    id: String,
    api: Arc<dyn ProjectApi>,
    token: CancellationToken,
}

pub struct DetailOutcome {
    token: CancellationToken,
    result: Result<Project, AuthoringError>,
}

impl DetailTask {
    pub async fn run(self) -> DetailOutcome {
        let result = self
            .api
            .get_project(&self.id)
            .await
            .map_err(|e| AuthoringError::from_load(e, DETAIL_FALLBACK));
        DetailOutcome {
            token: self.token,
            result,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProjectDetailLoader {
    project: Option<Project>,
    is_loading: bool,
    error: Option<String>,
    scope: EffectScope,
}

impl ProjectDetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `subject` may open the edit form for the shown project
    pub fn can_edit(&self, subject: Option<&str>) -> bool {
        match (&self.project, subject) {
            (Some(project), Some(sub)) => project.author_id == sub,
            _ => false,
        }
    }

    pub fn begin(&mut self, api: Arc<dyn ProjectApi>, id: &str) -> Option<DetailTask> {
        if !self.scope.is_live() {
            return None;
        }
        let token = self.scope.restart();
        self.is_loading = true;
        self.error = None;
        Some(DetailTask {
            id: id.to_string(),
            api,
            token,
        })
    }

    pub fn finish(&mut self, outcome: DetailOutcome) -> bool {
        if outcome.token.is_cancelled() || !self.scope.is_live() {
            debug!("Dropping stale project detail");
            return false;
        }
        match outcome.result {
            Ok(project) => self.project = Some(project),
            Err(err) => {
                self.project = None;
                self.error = Some(err.to_string());
            }
        }
        self.is_loading = false;
        true
    }

    pub fn unmount(&mut self) {
        self.scope.teardown();
    }
}
