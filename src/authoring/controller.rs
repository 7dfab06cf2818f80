//! Authoring lifecycle controller
//!
//! Drives one create/edit form from mount to unmount:
//!
//! ```text
//! Idle → Loading (edit only) → Ready → Validating → TokenAcquiring → Submitting
//!                                ↑                                      │
//!                                └────────────── Failed ←───────────────┤
//!                                                                       ↓
//!                                                         Succeeded → navigate away
//! ```
//!
//! The edit-mode load is split into [`AuthoringController::begin_load`],
//! [`LoadTask::run`] and [`AuthoringController::finish_load`] so the fetch can
//! run on its own task while the form stays responsive. A load whose token
//! was cancelled (unmount, or a newer load) is dropped without touching state.

use super::error::AuthoringError;
use super::scope::EffectScope;
use crate::api::ProjectApi;
use crate::auth::{Acquisition, AccessToken, SessionHandle, TokenNegotiator, TokenParams};
use crate::editor::{Command, RichTextEditor};
use crate::state::{
    validate, Alert, AuthoringMode, AuthoringSession, Field, Industry, Phase, Project,
    ProjectForm, Route,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOAD_FALLBACK: &str = "Unable to load project.";

/// What a submit attempt ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Refused without doing anything (already submitting, loading, unmounted)
    Ignored,
    /// An identity provider redirect took over; the form is about to go away
    Suspended,
    /// Saved; the caller navigates to `route`
    Succeeded { route: Route },
    /// Not saved; the alert and field errors describe why
    Failed(AuthoringError),
}

/// Fetch of the project being edited, detached from the controller
pub struct LoadTask {
    id: String,
    api: Arc<dyn ProjectApi>,
    token: CancellationToken,
}

/// Result of a [`LoadTask`], carrying the token it was started with
pub struct LoadOutcome {
    token: CancellationToken,
    result: Result<Project, AuthoringError>,
}

impl LoadTask {
    pub async fn run(self) -> LoadOutcome {
        let result = self
            .api
            .get_project(&self.id)
            .await
            .map_err(|e| AuthoringError::from_load(e, LOAD_FALLBACK));
        LoadOutcome {
            token: self.token,
            result,
        }
    }
}

pub struct AuthoringController {
    session: AuthoringSession,
    editor: RichTextEditor,
    body_updates: watch::Receiver<String>,
    api: Arc<dyn ProjectApi>,
    identity: SessionHandle,
    negotiator: TokenNegotiator,
    token_params: TokenParams,
    scope: EffectScope,
}

impl AuthoringController {
    pub fn new(
        mode: AuthoringMode,
        api: Arc<dyn ProjectApi>,
        identity: SessionHandle,
        token_params: TokenParams,
    ) -> Self {
        let session = AuthoringSession::new(mode);
        let (body_tx, body_updates) = watch::channel(session.form().body.clone());
        let mut editor = RichTextEditor::new(session.form().body.clone(), move |markup: &str| {
            body_tx.send_replace(markup.to_string());
        });
        editor.initialize();

        let mut controller = Self {
            session,
            editor,
            body_updates,
            api,
            negotiator: TokenNegotiator::new(identity.clone()),
            identity,
            token_params,
            scope: EffectScope::new(),
        };
        if matches!(controller.session.mode(), AuthoringMode::Create) {
            controller.session.set_phase(Phase::Ready);
        }
        controller
    }

    pub fn session(&self) -> &AuthoringSession {
        &self.session
    }

    pub fn editor(&self) -> &RichTextEditor {
        &self.editor
    }

    pub fn is_live(&self) -> bool {
        self.scope.is_live()
    }

    /// Whether the signed-in user wrote the loaded project
    pub fn is_author(&self) -> bool {
        self.session.loaded_project().is_some_and(|project| {
            self.identity.subject().as_deref() == Some(project.author_id.as_str())
        })
    }

    /// An edit form whose project belongs to someone else
    pub fn is_read_only(&self) -> bool {
        matches!(self.session.mode(), AuthoringMode::Edit { .. })
            && self.session.loaded_project().is_some()
            && !self.is_author()
    }

    /// Create forms take input while mounted; edit forms only for the author
    fn accepts_input(&self) -> bool {
        self.is_live()
            && match self.session.mode() {
                AuthoringMode::Create => true,
                AuthoringMode::Edit { .. } => self.is_author(),
            }
    }

    /// Route this form lives at; used as the login continuation target
    pub fn route(&self) -> Route {
        match self.session.mode() {
            AuthoringMode::Create => Route::ProjectCreate,
            AuthoringMode::Edit { id } => Route::ProjectEdit { id: id.clone() },
        }
    }

    /// Mount-time effect: edit mode returns the load to run
    pub fn mount(&mut self) -> Option<LoadTask> {
        match self.session.mode().clone() {
            AuthoringMode::Create => None,
            AuthoringMode::Edit { id } => self.begin_load(&id),
        }
    }

    /// Unmount: outstanding loads can no longer touch this session
    pub fn unmount(&mut self) {
        debug!(
            "Authoring session for {} torn down after {} writes",
            self.route().path(),
            self.session.revision()
        );
        self.scope.teardown();
    }

    /// Start loading `id`, superseding any load already in flight
    pub fn begin_load(&mut self, id: &str) -> Option<LoadTask> {
        if !self.is_live() {
            return None;
        }
        let token = self.scope.restart();
        self.session.set_phase(Phase::Loading);
        self.session.set_loading(true);
        self.session.set_load_error(None);
        Some(LoadTask {
            id: id.to_string(),
            api: Arc::clone(&self.api),
            token,
        })
    }

    /// Apply a finished load. Returns false if the load was stale.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.token.is_cancelled() || !self.is_live() {
            debug!("Dropping stale project load");
            return false;
        }
        match outcome.result {
            Ok(project) => {
                let form = ProjectForm::from_project(&project);
                self.editor.set_content(&form.body);
                self.session.set_form(form);
                self.session.set_loaded_project(Some(project));
            }
            Err(err) => {
                warn!("Failed to load project: {err}");
                let message = err.to_string();
                self.session.set_load_error(Some(message.clone()));
                self.session.set_alert(Some(Alert::error(message)));
            }
        }
        self.session.set_loading(false);
        self.session.set_phase(Phase::Ready);
        true
    }

    /// Load and apply in one go
    #[cfg(test)]
    pub async fn load_for_edit(&mut self, id: &str) -> bool {
        match self.begin_load(id) {
            Some(task) => {
                let outcome = task.run().await;
                self.finish_load(outcome)
            }
            None => false,
        }
    }

    /// Replace a text field's value, clearing its error
    pub fn set_text(&mut self, field: Field, value: String) {
        if !self.accepts_input() || self.session.form().text(field) == Some(value.as_str()) {
            return;
        }
        if self.session.form_mut().set_text(field, value) {
            self.field_changed(field);
        }
    }

    pub fn input_char(&mut self, field: Field, c: char) {
        if self.accepts_input() && self.session.form_mut().push_char(field, c) {
            self.field_changed(field);
        }
    }

    pub fn delete_char(&mut self, field: Field) {
        if self.accepts_input() && self.session.form_mut().pop_char(field) {
            self.field_changed(field);
        }
    }

    pub fn set_industry(&mut self, industry: Option<Industry>) {
        if !self.accepts_input() || self.session.form().industry == industry {
            return;
        }
        self.session.form_mut().industry = industry;
        self.field_changed(Field::Industry);
    }

    /// Step the industry select forward or backward
    pub fn cycle_industry(&mut self, forward: bool) {
        let next = match (self.session.form().industry, forward) {
            (None, true) => Industry::ALL[0],
            (None, false) => Industry::ALL[Industry::ALL.len() - 1],
            (Some(current), true) => current.next(),
            (Some(current), false) => current.prev(),
        };
        self.set_industry(Some(next));
    }

    fn field_changed(&mut self, field: Field) {
        if self.session.errors().contains(field) {
            self.session.errors_mut().clear(field);
        }
    }

    /// Run an editor operation and pull any emitted markup into the form
    pub fn edit_body(&mut self, f: impl FnOnce(&mut RichTextEditor)) {
        if !self.accepts_input() {
            return;
        }
        f(&mut self.editor);
        self.sync_body();
    }

    pub fn toggle(&mut self, command: Command) {
        self.edit_body(|editor| editor.toggle(command));
    }

    fn sync_body(&mut self) {
        if !self.body_updates.has_changed().unwrap_or(false) {
            return;
        }
        let markup = self.body_updates.borrow_and_update().clone();
        if self.session.form().body != markup {
            self.session.form_mut().body = markup;
            self.field_changed(Field::Body);
        }
    }

    fn texts(&self) -> (&'static str, &'static str, &'static str) {
        match self.session.mode() {
            AuthoringMode::Create => (
                "Project created successfully.",
                "Failed to create project.",
                "Unexpected error creating project.",
            ),
            AuthoringMode::Edit { .. } => (
                "Project updated successfully.",
                "Failed to update project.",
                "Unexpected error updating project.",
            ),
        }
    }

    /// Record a failure in the session and return it
    fn fail(&mut self, err: AuthoringError) -> SubmitOutcome {
        if self.is_live() {
            if let Some(fields) = err.field_errors() {
                let mut errors = self.session.errors().clone();
                errors.merge(fields.clone());
                self.session.set_errors(errors);
            }
            self.session.set_alert(Some(Alert::error(err.to_string())));
            self.session.set_submitting(false);
            self.session.set_phase(Phase::Failed);
            self.session.set_phase(Phase::Ready);
        }
        SubmitOutcome::Failed(err)
    }

    /// Validate, authorize, acquire a token and save.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.is_live() || self.session.is_loading() {
            return SubmitOutcome::Ignored;
        }
        if self.session.is_submitting() {
            debug!("Submit ignored, one is already in flight");
            return SubmitOutcome::Ignored;
        }

        self.session.set_alert(None);
        self.session.set_phase(Phase::Validating);
        let errors = validate(self.session.form());
        self.session.set_errors(errors.clone());
        if !errors.is_empty() {
            debug!("Submit blocked by {} field errors", errors.len());
            return self.fail(AuthoringError::Validation(errors));
        }

        let route = self.route();
        if !self.identity.is_authenticated() && !self.identity.is_loading() {
            info!("No identity session, redirecting to login");
            return match self.negotiator.login(&route).await {
                Ok(()) => SubmitOutcome::Suspended,
                Err(err) => self.fail(AuthoringError::Auth(err)),
            };
        }

        if let (Some(project), Some(subject)) =
            (self.session.loaded_project(), self.identity.subject())
        {
            if project.author_id != subject {
                return self.fail(AuthoringError::Authorization);
            }
        }

        self.session.set_submitting(true);
        self.session.set_phase(Phase::TokenAcquiring);
        let token: AccessToken = match self.negotiator.acquire(&self.token_params, &route).await {
            Ok(Acquisition::Granted(token)) => token,
            Ok(Acquisition::Redirected) => {
                if self.is_live() {
                    self.session.set_submitting(false);
                }
                return SubmitOutcome::Suspended;
            }
            Err(err) => return self.fail(AuthoringError::Auth(err)),
        };
        if !self.is_live() {
            return SubmitOutcome::Ignored;
        }

        self.session.set_phase(Phase::Submitting);
        let payload = self.session.form().to_payload();
        let result = match self.session.mode() {
            AuthoringMode::Create => self.api.create_project(&payload, token).await,
            AuthoringMode::Edit { id } => self.api.update_project(id, &payload, token).await,
        };
        if !self.is_live() {
            return SubmitOutcome::Ignored;
        }

        let (success, rejected, unexpected) = self.texts();
        match result {
            Ok(project) => {
                info!("Saved project {}", project.id);
                self.session.set_alert(Some(Alert::success(success)));
                self.session.errors_mut().clear_all();
                self.session.set_submitting(false);
                self.session.set_phase(Phase::Succeeded);
                SubmitOutcome::Succeeded {
                    route: Route::ProjectDetail { id: project.id },
                }
            }
            Err(err) => {
                warn!("Project save failed: {err}");
                self.fail(AuthoringError::from_submit(err, rejected, unexpected))
            }
        }
    }
}

impl Drop for AuthoringController {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockProjectApi, ServerMessage};
    use crate::auth::{AuthError, MockIdentityProvider, Prompt};
    use crate::state::{AlertKind, UserProfile};
    use mockall::predicate::eq;

    const AUTHOR: &str = "auth0|alice";

    fn params() -> TokenParams {
        TokenParams::new(Some("https://api.folio.dev".into()), "openid profile email")
    }

    fn stored_project(id: &str, author: &str) -> Project {
        Project {
            id: id.to_string(),
            name: "Networking App".to_string(),
            description: "A platform for developers".to_string(),
            body: "<p>Connect developers with each other.</p>".to_string(),
            tags: vec!["React".to_string(), "Node.js".to_string()],
            industry: Industry::Tech,
            banner: "https://placehold.co/600x400".to_string(),
            author_id: author.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Identity provider for a signed-in user whose silent acquisition works
    fn signed_in(sub: &str) -> MockIdentityProvider {
        let sub = sub.to_string();
        let mut provider = MockIdentityProvider::new();
        provider.expect_is_authenticated().return_const(true);
        provider.expect_is_loading().return_const(false);
        provider.expect_user().returning(move || {
            Some(UserProfile {
                sub: sub.clone(),
                ..Default::default()
            })
        });
        provider
    }

    fn controller(
        mode: AuthoringMode,
        api: MockProjectApi,
        provider: MockIdentityProvider,
    ) -> AuthoringController {
        AuthoringController::new(
            mode,
            Arc::new(api),
            SessionHandle::new(Arc::new(provider)),
            params(),
        )
    }

    fn fill_valid(c: &mut AuthoringController) {
        c.set_text(Field::Name, "Networking App".into());
        c.set_text(Field::Description, "A platform for developers".into());
        c.set_text(Field::Tags, "rust, tui".into());
        c.set_industry(Some(Industry::Tech));
        c.edit_body(|e| e.insert_text("Twenty or more characters of body"));
    }

    mod fields {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_create_starts_ready_with_defaults() {
            let c = controller(
                AuthoringMode::Create,
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            assert_eq!(c.session().phase(), Phase::Ready);
            assert_eq!(c.route(), Route::ProjectCreate);
            assert!(c.editor().is_ready());
        }

        #[test]
        fn test_editing_field_clears_only_its_error() {
            let mut c = controller(
                AuthoringMode::Create,
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            let mut errors = validate(c.session().form());
            errors.set(Field::Name, "bad");
            c.session.set_errors(errors);

            c.input_char(Field::Name, 'x');
            assert!(!c.session().errors().contains(Field::Name));
            assert!(c.session().errors().contains(Field::Description));
        }

        #[test]
        fn test_editor_changes_flow_into_body() {
            let mut c = controller(
                AuthoringMode::Create,
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            c.session.errors_mut().set(Field::Body, "too short");
            c.edit_body(|e| e.insert_text("Hello"));
            assert_eq!(c.session().form().body, "<p>Hello</p>");
            assert!(!c.session().errors().contains(Field::Body));

            c.edit_body(|e| e.select_all());
            c.toggle(Command::ToggleBold);
            assert_eq!(c.session().form().body, "<p><strong>Hello</strong></p>");
        }

        #[test]
        fn test_cycle_industry_from_unset() {
            let mut c = controller(
                AuthoringMode::Create,
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            c.cycle_industry(true);
            assert_eq!(c.session().form().industry, Some(Industry::Tech));
            c.cycle_industry(false);
            assert_eq!(c.session().form().industry, Some(Industry::Other));
        }
    }

    mod load {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_load_seeds_form_and_editor() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .with(eq("7"))
                .times(1)
                .returning(|id| Ok(stored_project(id, AUTHOR)));
            let mut c = controller(
                AuthoringMode::Edit { id: "7".into() },
                api,
                MockIdentityProvider::new(),
            );
            assert_eq!(c.session().phase(), Phase::Idle);

            assert!(c.load_for_edit("7").await);
            let form = c.session().form();
            assert_eq!(form.tags_input, "React, Node.js");
            assert_eq!(form.name, "Networking App");
            assert_eq!(c.editor().serialized(), form.body);
            assert_eq!(c.session().phase(), Phase::Ready);
            assert!(!c.session().is_loading());
            assert!(c.session().loaded_project().is_some());
        }

        #[tokio::test]
        async fn test_load_failure_is_page_alert() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(|_| Err(ApiError::NotFound("Project not found.".into())));
            let mut c = controller(
                AuthoringMode::Edit { id: "404".into() },
                api,
                MockIdentityProvider::new(),
            );
            let task = c.mount().unwrap();
            let outcome = task.run().await;
            assert!(c.finish_load(outcome));

            assert_eq!(c.session().load_error(), Some("Project not found."));
            let alert = c.session().alert().unwrap();
            assert_eq!(alert.kind, AlertKind::Error);
            assert!(c.session().errors().is_empty());
        }

        #[tokio::test]
        async fn test_unmount_during_load_leaves_state_untouched() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(|id| Ok(stored_project(id, AUTHOR)));
            let mut c = controller(
                AuthoringMode::Edit { id: "7".into() },
                api,
                MockIdentityProvider::new(),
            );
            let task = c.mount().unwrap();
            c.unmount();
            let revision = c.session().revision();

            let outcome = tokio::spawn(task.run()).await.unwrap();
            assert!(!c.finish_load(outcome));
            c.input_char(Field::Name, 'x');

            assert_eq!(c.session().revision(), revision);
            assert!(c.session().loaded_project().is_none());
        }

        #[tokio::test]
        async fn test_superseded_load_is_dropped() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(|id| Ok(stored_project(id, AUTHOR)));
            let mut c = controller(
                AuthoringMode::Edit { id: "1".into() },
                api,
                MockIdentityProvider::new(),
            );
            let stale = c.begin_load("1").unwrap();
            let fresh = c.begin_load("2").unwrap();

            let fresh_outcome = fresh.run().await;
            assert!(c.finish_load(fresh_outcome));
            let stale_outcome = stale.run().await;
            assert!(!c.finish_load(stale_outcome));

            assert_eq!(c.session().loaded_project().unwrap().id, "2");
        }
    }

    mod access {
        use super::*;
        use pretty_assertions::assert_eq;

        async fn loaded(author: &'static str, viewer: &str) -> AuthoringController {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(move |id| Ok(stored_project(id, author)));
            let mut c = controller(AuthoringMode::Edit { id: "7".into() }, api, signed_in(viewer));
            assert!(c.load_for_edit("7").await);
            c
        }

        #[tokio::test]
        async fn test_non_author_input_is_ignored() {
            let mut c = loaded("auth0|bob", AUTHOR).await;
            let before = c.session().form().clone();

            c.input_char(Field::Name, '!');
            c.delete_char(Field::Description);
            c.set_text(Field::Tags, "hijacked".into());
            c.cycle_industry(true);
            c.edit_body(|e| e.insert_text("typed by someone else"));
            c.toggle(Command::ToggleBold);

            assert!(!c.is_author());
            assert!(c.is_read_only());
            assert_eq!(c.session().form(), &before);
            assert_eq!(c.editor().serialized(), before.body);
        }

        #[tokio::test]
        async fn test_author_can_edit_loaded_project() {
            let mut c = loaded(AUTHOR, AUTHOR).await;
            c.input_char(Field::Name, '!');
            assert!(c.is_author());
            assert!(!c.is_read_only());
            assert_eq!(c.session().form().name, "Networking App!");
        }

        #[test]
        fn test_edit_form_ignores_input_until_loaded() {
            let mut c = controller(
                AuthoringMode::Edit { id: "7".into() },
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            c.input_char(Field::Name, 'x');
            assert_eq!(c.session().form().name, "");
            assert!(!c.is_read_only());
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_invalid_form_makes_no_calls() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().never();
            let mut provider = MockIdentityProvider::new();
            provider.expect_get_token_silently().never();
            let mut c = controller(AuthoringMode::Create, api, provider);

            let outcome = c.submit().await;
            assert!(matches!(
                outcome,
                SubmitOutcome::Failed(AuthoringError::Validation(_))
            ));
            assert_eq!(
                c.session().alert().unwrap().message,
                "Please fix the highlighted errors."
            );
            assert!(c.session().errors().contains(Field::Name));
            assert_eq!(c.session().phase(), Phase::Ready);
            assert!(!c.session().is_submitting());
        }

        #[tokio::test]
        async fn test_valid_create_calls_api_once_and_navigates() {
            let mut api = MockProjectApi::new();
            api.expect_create_project()
                .withf(|payload, token| {
                    payload.tags == vec!["rust".to_string(), "tui".to_string()]
                        && token.secret() == "tok"
                })
                .times(1)
                .returning(|_, _| Ok(stored_project("new-1", AUTHOR)));
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .times(1)
                .returning(|_| Ok(AccessToken::new("tok")));
            provider.expect_login_with_redirect().never();

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            let outcome = c.submit().await;

            assert_eq!(
                outcome,
                SubmitOutcome::Succeeded {
                    route: Route::ProjectDetail { id: "new-1".into() }
                }
            );
            assert_eq!(
                c.session().alert(),
                Some(&Alert::success("Project created successfully."))
            );
            assert!(c.session().errors().is_empty());
        }

        #[tokio::test]
        async fn test_silent_failure_redirects_without_api_call() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().never();
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .returning(|_| Err(AuthError::LoginRequired));
            provider
                .expect_login_with_redirect()
                .withf(|opts| {
                    opts.return_to == "/project/create" && opts.prompt == Some(Prompt::Consent)
                })
                .times(1)
                .returning(|_| Ok(()));

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            assert_eq!(c.submit().await, SubmitOutcome::Suspended);
            assert!(!c.session().is_submitting());
        }

        #[tokio::test]
        async fn test_unauthenticated_user_is_sent_to_login() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().never();
            let mut provider = MockIdentityProvider::new();
            provider.expect_is_authenticated().return_const(false);
            provider.expect_is_loading().return_const(false);
            provider.expect_get_token_silently().never();
            provider
                .expect_login_with_redirect()
                .withf(|opts| opts.prompt.is_none() && opts.return_to == "/project/create")
                .times(1)
                .returning(|_| Ok(()));

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            assert_eq!(c.submit().await, SubmitOutcome::Suspended);
        }

        #[tokio::test]
        async fn test_server_errors_are_remapped() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().times(1).returning(|_, _| {
                Err(ApiError::Rejected {
                    status: 400,
                    message: Some(ServerMessage::List(vec![
                        "name too short".into(),
                        "banner required".into(),
                    ])),
                })
            });
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .returning(|_| Ok(AccessToken::new("tok")));

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            let outcome = c.submit().await;

            assert!(matches!(
                outcome,
                SubmitOutcome::Failed(AuthoringError::ServerValidation { .. })
            ));
            let errors = c.session().errors();
            assert_eq!(errors.len(), 2);
            assert_eq!(errors.get(Field::Name), Some("name too short"));
            assert_eq!(errors.get(Field::Banner), Some("banner required"));
            let alert = c.session().alert().unwrap();
            assert!(alert.message.contains("name too short"));
            assert!(alert.message.contains("banner required"));
            assert_eq!(c.session().phase(), Phase::Ready);
            assert!(!c.session().is_submitting());
        }

        #[tokio::test]
        async fn test_unmapped_server_message_is_alert_only() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().returning(|_, _| {
                Err(ApiError::Rejected {
                    status: 429,
                    message: Some(ServerMessage::List(vec!["Slow down".into()])),
                })
            });
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .returning(|_| Ok(AccessToken::new("tok")));

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            c.submit().await;
            assert!(c.session().errors().is_empty());
            assert_eq!(c.session().alert().unwrap().message, "Slow down");
        }

        #[tokio::test]
        async fn test_network_failure_uses_fallback() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().returning(|_, _| {
                Err(ApiError::Rejected {
                    status: 502,
                    message: None,
                })
            });
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .returning(|_| Ok(AccessToken::new("tok")));

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            c.submit().await;
            assert_eq!(
                c.session().alert(),
                Some(&Alert::error("Failed to create project."))
            );
        }

        #[tokio::test]
        async fn test_edit_by_other_user_is_forbidden_locally() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(|id| Ok(stored_project(id, "auth0|bob")));
            api.expect_update_project().never();
            let mut provider = signed_in(AUTHOR);
            provider.expect_get_token_silently().never();

            let mut c = controller(AuthoringMode::Edit { id: "7".into() }, api, provider);
            c.load_for_edit("7").await;
            let outcome = c.submit().await;

            assert_eq!(outcome, SubmitOutcome::Failed(AuthoringError::Authorization));
            assert_eq!(
                c.session().alert().unwrap().message,
                "You are not authorized to edit this project."
            );
        }

        #[tokio::test]
        async fn test_edit_by_owner_updates() {
            let mut api = MockProjectApi::new();
            api.expect_get_project()
                .returning(|id| Ok(stored_project(id, AUTHOR)));
            api.expect_update_project()
                .withf(|id, payload, _| id == "7" && payload.name == "Renamed App")
                .times(1)
                .returning(|id, _, _| Ok(stored_project(id, AUTHOR)));
            let mut provider = signed_in(AUTHOR);
            provider
                .expect_get_token_silently()
                .returning(|_| Ok(AccessToken::new("tok")));

            let mut c = controller(AuthoringMode::Edit { id: "7".into() }, api, provider);
            c.load_for_edit("7").await;
            c.set_text(Field::Name, "  Renamed App ".into());
            let outcome = c.submit().await;

            assert_eq!(
                outcome,
                SubmitOutcome::Succeeded {
                    route: Route::ProjectDetail { id: "7".into() }
                }
            );
            assert_eq!(
                c.session().alert(),
                Some(&Alert::success("Project updated successfully."))
            );
        }

        #[tokio::test]
        async fn test_submit_while_submitting_is_ignored() {
            let mut api = MockProjectApi::new();
            api.expect_create_project().never();
            let mut provider = MockIdentityProvider::new();
            provider.expect_get_token_silently().never();

            let mut c = controller(AuthoringMode::Create, api, provider);
            fill_valid(&mut c);
            c.session.set_submitting(true);
            assert_eq!(c.submit().await, SubmitOutcome::Ignored);
        }

        #[tokio::test]
        async fn test_submit_clears_previous_alert_first() {
            let mut c = controller(
                AuthoringMode::Create,
                MockProjectApi::new(),
                MockIdentityProvider::new(),
            );
            c.session.set_alert(Some(Alert::success("old")));
            c.submit().await;
            assert_eq!(
                c.session().alert().unwrap().message,
                "Please fix the highlighted errors."
            );
        }
    }
}
