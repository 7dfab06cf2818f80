//! Application state and core logic

use crate::api::{HttpProjectClient, ProjectApi};
use crate::auth::{CompletedLogin, OAuthProvider, PendingRedirect, SessionHandle, TokenNegotiator};
use crate::authoring::{
    AuthoringController, DetailOutcome, ListOutcome, ListTask, LoadOutcome, ProjectDetailLoader,
    ProjectListLoader, SubmitOutcome,
};
use crate::config::AppConfig;
use crate::platform;
use crate::state::{AuthoringMode, Field, ProfileTab, Route};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Results of background work, delivered back to the event loop
pub enum AppEvent {
    ProjectLoaded(LoadOutcome),
    DetailLoaded(DetailOutcome),
    ListLoaded(ListOutcome),
}

/// Authoring form plus which input has focus
pub struct AuthoringView {
    pub controller: AuthoringController,
    pub focus: Field,
}

/// The mounted view for the current route
pub enum Screen {
    Home,
    Authoring(AuthoringView),
    Detail {
        id: String,
        loader: ProjectDetailLoader,
    },
    Profile {
        tab: ProfileTab,
        list: ProjectListLoader,
        selected: usize,
    },
}

impl Screen {
    /// Tear down the view's effects before it is replaced
    fn unmount(&mut self) {
        match self {
            Self::Home => {}
            Self::Authoring(view) => view.controller.unmount(),
            Self::Detail { loader, .. } => loader.unmount(),
            Self::Profile { list, .. } => list.unmount(),
        }
    }
}

/// Main application struct
pub struct App {
    pub config: AppConfig,
    api: Arc<dyn ProjectApi>,
    pub identity: SessionHandle,
    /// Concrete provider, present outside tests, for browser sign-in
    oauth: Option<Arc<OAuthProvider>>,
    pub route: Route,
    history: Vec<Route>,
    pub screen: Screen,
    /// Login the user still has to complete in a browser
    pub pending_redirect: Option<PendingRedirect>,
    /// One-line feedback in the status bar
    pub status_message: Option<String>,
    /// Modal error queue
    pub errors: Vec<String>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    quit: bool,
}

impl App {
    /// Create a new App instance from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let settings = config.oauth_settings().context(
            "identity provider not configured: set FOLIO_AUTH_DOMAIN and FOLIO_AUTH_CLIENT_ID",
        )?;
        let oauth = Arc::new(OAuthProvider::new(settings, AppConfig::credentials_path()));
        let api: Arc<dyn ProjectApi> = Arc::new(HttpProjectClient::new(&config.api_url));
        let identity = SessionHandle::new(oauth.clone());
        let mut app = Self::with_services(config, api, identity);
        app.oauth = Some(oauth);
        Ok(app)
    }

    /// Build an app around already constructed services
    pub fn with_services(config: AppConfig, api: Arc<dyn ProjectApi>, identity: SessionHandle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            api,
            identity,
            oauth: None,
            route: Route::Home,
            history: Vec::new(),
            screen: Screen::Home,
            pending_redirect: None,
            status_message: None,
            errors: Vec::new(),
            events_tx,
            events_rx,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Navigate to `route`, unmounting the current view
    pub fn navigate(&mut self, route: Route) {
        let previous = std::mem::replace(&mut self.route, route.clone());
        self.history.push(previous);
        self.mount(route);
    }

    /// Go back to the previous non-authoring route
    pub fn go_back(&mut self) {
        while let Some(route) = self.history.pop() {
            if route.is_authoring() {
                continue;
            }
            self.route = route.clone();
            self.mount(route);
            return;
        }
        self.route = Route::Home;
        self.mount(Route::Home);
    }

    fn mount(&mut self, route: Route) {
        self.screen.unmount();
        debug!("Mounting {}", route.path());
        self.screen = match route {
            Route::Home => Screen::Home,
            Route::ProjectCreate => self.mount_authoring(AuthoringMode::Create),
            Route::ProjectEdit { id } => self.mount_authoring(AuthoringMode::Edit { id }),
            Route::ProjectDetail { id } => {
                let mut loader = ProjectDetailLoader::new();
                if let Some(task) = loader.begin(Arc::clone(&self.api), &id) {
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(AppEvent::DetailLoaded(task.run().await));
                    });
                }
                Screen::Detail { id, loader }
            }
            Route::Profile { tab } => {
                let mut list = ProjectListLoader::new(self.config.page_size);
                if tab == ProfileTab::Projects {
                    spawn_listing(&mut list, self);
                }
                Screen::Profile {
                    tab,
                    list,
                    selected: 0,
                }
            }
        };
    }

    fn mount_authoring(&mut self, mode: AuthoringMode) -> Screen {
        let mut controller = AuthoringController::new(
            mode,
            Arc::clone(&self.api),
            self.identity.clone(),
            self.config.token_params(),
        );
        if let Some(task) = controller.mount() {
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(AppEvent::ProjectLoaded(task.run().await));
            });
        }
        Screen::Authoring(AuthoringView {
            controller,
            focus: Field::Name,
        })
    }

    /// Apply every background result that has arrived
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
        if let Some(login) = self.oauth.as_ref().and_then(|p| p.take_completed_login()) {
            self.finish_login(login);
        }
    }

    /// Continue where the browser sign-in was started from
    fn finish_login(&mut self, login: CompletedLogin) {
        self.pending_redirect = None;
        match login.result {
            Ok(()) => {
                info!("Continuing at {} after sign-in", login.return_to);
                self.status_message = Some("Signed in".to_string());
                let route = Route::parse(&login.return_to);
                self.route = route.clone();
                self.mount(route);
            }
            Err(err) => self.push_error(err.to_string()),
        }
    }

    /// Results for views that are no longer mounted are dropped
    pub fn handle_event(&mut self, event: AppEvent) {
        let applied = match (event, &mut self.screen) {
            (AppEvent::ProjectLoaded(outcome), Screen::Authoring(view)) => {
                view.controller.finish_load(outcome)
            }
            (AppEvent::DetailLoaded(outcome), Screen::Detail { loader, .. }) => {
                loader.finish(outcome)
            }
            (AppEvent::ListLoaded(outcome), Screen::Profile { list, .. }) => list.finish(outcome),
            _ => false,
        };
        if !applied {
            debug!("Background result arrived for an unmounted view");
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Error dialog is modal
        if !self.errors.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.errors.remove(0);
            }
            return Ok(());
        }

        if self.pending_redirect.is_some() {
            self.handle_redirect_key(key);
            return Ok(());
        }

        self.status_message = None;

        match self.screen {
            Screen::Home => self.handle_home_key(key).await,
            Screen::Authoring(_) => self.handle_authoring_key(key).await,
            Screen::Detail { .. } => self.handle_detail_key(key),
            Screen::Profile { .. } => self.handle_profile_key(key).await,
        }
        Ok(())
    }

    /// Enter opens the sign-in page, Esc abandons the sign-in
    fn handle_redirect_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(redirect) = &self.pending_redirect {
                    if let Err(e) = platform::open_in_browser(&redirect.url) {
                        warn!("Could not open a browser: {e}");
                        self.status_message =
                            Some("Could not open a browser; open the address shown".to_string());
                    }
                }
            }
            KeyCode::Esc => {
                if let Some(oauth) = &self.oauth {
                    oauth.cancel_login();
                }
                self.pending_redirect = None;
            }
            _ => {}
        }
    }

    async fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => self.navigate(Route::ProjectCreate),
            KeyCode::Char('p') => self.navigate(Route::Profile {
                tab: ProfileTab::Info,
            }),
            KeyCode::Char('l') if self.identity.is_authenticated() => self.logout().await,
            KeyCode::Char('l') => self.login().await,
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Screen::Detail { id, loader } = &self.screen else {
            return;
        };
        match key.code {
            KeyCode::Char('e') => {
                if loader.can_edit(self.identity.subject().as_deref()) {
                    let id = id.clone();
                    self.navigate(Route::ProjectEdit { id });
                } else {
                    self.status_message =
                        Some("You are not authorized to edit this project.".to_string());
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.go_back(),
            _ => {}
        }
    }

    async fn handle_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                let Screen::Profile { tab, .. } = &self.screen else {
                    return;
                };
                let tab = tab.toggle();
                self.route = Route::Profile { tab };
                self.mount(Route::Profile { tab });
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Screen::Profile { list, selected, .. } = &mut self.screen {
                    if *selected + 1 < list.projects().len() {
                        *selected += 1;
                    }
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Screen::Profile { selected, .. } = &mut self.screen {
                    *selected = selected.saturating_sub(1);
                }
            }
            KeyCode::Enter => {
                let id = match &self.screen {
                    Screen::Profile {
                        tab: ProfileTab::Projects,
                        list,
                        selected,
                    } => list.projects().get(*selected).map(|p| p.id.clone()),
                    _ => None,
                };
                if let Some(id) = id {
                    self.navigate(Route::ProjectDetail { id });
                }
            }
            KeyCode::Char('r') => {
                if let Screen::Profile {
                    tab: ProfileTab::Projects,
                    list,
                    ..
                } = &mut self.screen
                {
                    if let Some(task) = list.begin(
                        Arc::clone(&self.api),
                        &self.identity,
                        self.config.token_params(),
                    ) {
                        spawn_list_task(task, &self.events_tx);
                    }
                }
            }
            KeyCode::Char('n') => self.navigate(Route::ProjectCreate),
            KeyCode::Char('l') => self.logout().await,
            KeyCode::Esc | KeyCode::Char('q') => self.go_back(),
            _ => {}
        }
    }

    async fn handle_authoring_key(&mut self, key: KeyEvent) {
        if platform::is_save(&key) {
            self.submit().await;
            return;
        }
        if key.code == KeyCode::Esc {
            self.go_back();
            return;
        }

        let Screen::Authoring(view) = &mut self.screen else {
            return;
        };
        match key.code {
            KeyCode::Tab => {
                view.focus = view.focus.next();
                return;
            }
            KeyCode::BackTab => {
                view.focus = view.focus.prev();
                return;
            }
            _ => {}
        }

        let controller = &mut view.controller;
        match view.focus {
            Field::Body => handle_body_key(controller, key),
            Field::Industry => match key.code {
                KeyCode::Left | KeyCode::Up => controller.cycle_industry(false),
                KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                    controller.cycle_industry(true)
                }
                KeyCode::Delete => controller.set_industry(None),
                _ => {}
            },
            field if field.is_text() => match key.code {
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    controller.set_text(field, String::new())
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    controller.input_char(field, c)
                }
                KeyCode::Backspace => controller.delete_char(field),
                KeyCode::Enter => view.focus = field.next(),
                _ => {}
            },
            _ => {}
        }
    }

    /// Submit the mounted form and follow its outcome
    async fn submit(&mut self) {
        let Screen::Authoring(view) = &mut self.screen else {
            return;
        };
        match view.controller.submit().await {
            SubmitOutcome::Succeeded { route } => {
                self.status_message = view
                    .controller
                    .session()
                    .alert()
                    .map(|alert| alert.message.clone());
                self.navigate(route);
            }
            SubmitOutcome::Suspended => self.show_pending_redirect(),
            SubmitOutcome::Failed(err) => debug!("Submit failed: {err}"),
            SubmitOutcome::Ignored => {}
        }
    }

    fn show_pending_redirect(&mut self) {
        self.pending_redirect = self.oauth.as_ref().and_then(|p| p.take_pending_redirect());
    }

    async fn login(&mut self) {
        let negotiator = TokenNegotiator::new(self.identity.clone());
        match negotiator.login(&Route::Home).await {
            Ok(()) => self.show_pending_redirect(),
            Err(err) => {
                warn!("Sign-in could not start: {err}");
                self.push_error(err.to_string());
            }
        }
    }

    async fn logout(&mut self) {
        if !self.identity.is_authenticated() {
            self.status_message = Some("Not signed in".to_string());
            return;
        }
        match self.identity.provider().logout().await {
            Ok(()) => {
                info!("Signed out");
                self.status_message = Some("Signed out".to_string());
                if matches!(self.screen, Screen::Profile { .. }) {
                    self.navigate(Route::Home);
                }
            }
            Err(err) => {
                warn!("Logout failed: {err}");
                self.push_error(format!("Sign-out failed: {err}"));
            }
        }
    }
}

fn spawn_listing(list: &mut ProjectListLoader, app: &App) {
    if let Some(task) = list.begin(
        Arc::clone(&app.api),
        &app.identity,
        app.config.token_params(),
    ) {
        spawn_list_task(task, &app.events_tx);
    }
}

fn spawn_list_task(task: ListTask, tx: &mpsc::UnboundedSender<AppEvent>) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(AppEvent::ListLoaded(task.run().await));
    });
}

/// Keys inside the rich-text body
fn handle_body_key(controller: &mut AuthoringController, key: KeyEvent) {
    if let Some(command) = platform::toolbar_command(&key) {
        controller.toggle(command);
        return;
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('a') if key.modifiers.contains(platform::FORM_MODIFIER) => {
            controller.edit_body(|e| e.select_all())
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut buf = [0u8; 4];
            let text = c.encode_utf8(&mut buf);
            controller.edit_body(|e| e.insert_text(text));
        }
        KeyCode::Enter => controller.edit_body(|e| e.split_block()),
        KeyCode::Backspace => controller.edit_body(|e| e.backspace()),
        KeyCode::Left if shift => controller.edit_body(|e| e.extend_selection(false)),
        KeyCode::Right if shift => controller.edit_body(|e| e.extend_selection(true)),
        KeyCode::Left => controller.edit_body(|e| e.move_left()),
        KeyCode::Right => controller.edit_body(|e| e.move_right()),
        KeyCode::Up => controller.edit_body(|e| e.move_up()),
        KeyCode::Down => controller.edit_body(|e| e.move_down()),
        _ => {}
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.screen.unmount();
    }
}
