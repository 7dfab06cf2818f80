//! Authoring session state owned by one create/edit form

use super::forms::{FieldErrors, ProjectForm};
use super::Project;

/// Whether the form creates a new project or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthoringMode {
    Create,
    Edit { id: String },
}

/// Lifecycle phase of the authoring controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Validating,
    TokenAcquiring,
    Submitting,
    Succeeded,
    Failed,
}

impl Phase {
    /// Short progress label for phases with work in flight
    pub fn activity(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("loading…"),
            Self::Validating => Some("checking…"),
            Self::TokenAcquiring => Some("signing in…"),
            Self::Submitting => Some("saving…"),
            Self::Idle | Self::Ready | Self::Succeeded | Self::Failed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// The single page-level message shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            AlertKind::Success => "Success",
            AlertKind::Error => "Error",
        }
    }
}

/// Mutable state of one authoring form, from mount to unmount.
///
/// Every mutation goes through a setter so `revision` counts writes; a
/// torn-down session must never see its revision move again.
#[derive(Debug)]
pub struct AuthoringSession {
    mode: AuthoringMode,
    phase: Phase,
    form: ProjectForm,
    errors: FieldErrors,
    alert: Option<Alert>,
    is_submitting: bool,
    is_loading: bool,
    loaded_project: Option<Project>,
    load_error: Option<String>,
    revision: u64,
}

impl AuthoringSession {
    pub fn new(mode: AuthoringMode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            form: ProjectForm::default(),
            errors: FieldErrors::new(),
            alert: None,
            is_submitting: false,
            is_loading: false,
            loaded_project: None,
            load_error: None,
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn mode(&self) -> &AuthoringMode {
        &self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &ProjectForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn loaded_project(&self) -> Option<&Project> {
        self.loaded_project.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Number of writes applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.touch();
    }

    /// Mutable access to the form for a single edit
    pub fn form_mut(&mut self) -> &mut ProjectForm {
        self.touch();
        &mut self.form
    }

    pub fn set_form(&mut self, form: ProjectForm) {
        self.form = form;
        self.touch();
    }

    pub fn errors_mut(&mut self) -> &mut FieldErrors {
        self.touch();
        &mut self.errors
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
        self.touch();
    }

    /// Replace the current alert; there is only ever one
    pub fn set_alert(&mut self, alert: Option<Alert>) {
        self.alert = alert;
        self.touch();
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.is_submitting = submitting;
        self.touch();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.touch();
    }

    pub fn set_loaded_project(&mut self, project: Option<Project>) {
        self.loaded_project = project;
        self.touch();
    }

    pub fn set_load_error(&mut self, error: Option<String>) {
        self.load_error = error;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_clean() {
        let session = AuthoringSession::new(AuthoringMode::Create);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.alert().is_none());
        assert!(session.errors().is_empty());
        assert!(!session.is_submitting());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_every_setter_bumps_revision() {
        let mut session = AuthoringSession::new(AuthoringMode::Edit { id: "1".into() });
        session.set_loading(true);
        session.set_alert(Some(Alert::error("boom")));
        session.form_mut().name.push('x');
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn test_only_in_flight_phases_report_activity() {
        assert_eq!(Phase::Submitting.activity(), Some("saving…"));
        assert_eq!(Phase::TokenAcquiring.activity(), Some("signing in…"));
        assert_eq!(Phase::Ready.activity(), None);
        assert_eq!(Phase::Failed.activity(), None);
    }

    #[test]
    fn test_alert_replaces_previous() {
        let mut session = AuthoringSession::new(AuthoringMode::Create);
        session.set_alert(Some(Alert::error("first")));
        session.set_alert(Some(Alert::success("second")));
        let alert = session.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Success);
        assert_eq!(alert.message, "second");
        assert_eq!(alert.title(), "Success");
    }
}
