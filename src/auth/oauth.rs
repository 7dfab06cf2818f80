//! Refresh-token backed identity provider
//!
//! Silent acquisition serves cached access tokens and renews them with the
//! stored refresh token against `https://<domain>/oauth/token`. Interactive
//! login runs an authorization-code flow with PKCE: a loopback server takes
//! the browser redirect, the code is exchanged in the background and the
//! finished login is parked for the UI together with its `return_to` route.

use super::callback::{generate_state, CallbackServer, Pkce};
use super::provider::{AccessToken, AuthError, IdentityProvider, RedirectOptions, TokenParams};
use crate::state::UserProfile;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Tokens closer than this to expiry are refreshed
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// How long the browser sign-in may take
const LOGIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Scope asked for when a login names no token parameters
const LOGIN_SCOPE: &str = "openid profile email";

/// Needed for the provider to hand out a refresh token
const OFFLINE_ACCESS: &str = "offline_access";

/// Static provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub domain: String,
    pub client_id: String,
    /// Loopback port for the sign-in callback; 0 picks a free one
    pub callback_port: u16,
}

impl OAuthSettings {
    fn endpoint(&self, path: &str) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{domain}{path}")
        } else {
            format!("https://{domain}{path}")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_LEEWAY_SECS) > now
    }
}

/// Persisted credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    tokens: HashMap<String, CachedToken>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// A login the UI still has to send the user through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect {
    pub url: String,
    pub return_to: String,
}

/// Outcome of a browser sign-in, with the route to continue at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedLogin {
    pub return_to: String,
    pub result: Result<(), AuthError>,
}

/// Credentials in memory, mirrored to an optional cache file
#[derive(Debug, Clone)]
struct CredentialStore {
    path: Option<PathBuf>,
    credentials: Arc<RwLock<Credentials>>,
}

impl CredentialStore {
    fn load(path: Option<PathBuf>) -> Self {
        let credentials = path
            .as_ref()
            .and_then(|path| match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content)
                    .map_err(|e| warn!("Ignoring unreadable credentials cache: {e}"))
                    .ok(),
                Err(_) => None,
            })
            .unwrap_or_default();
        Self {
            path,
            credentials: Arc::new(RwLock::new(credentials)),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Credentials) -> T) -> Option<T> {
        self.credentials.read().ok().map(|c| f(&c))
    }

    /// Apply `change` and write the result to the cache file
    fn update(&self, change: impl FnOnce(&mut Credentials)) -> Result<(), AuthError> {
        let snapshot = {
            let mut credentials = self
                .credentials
                .write()
                .map_err(|e| AuthError::Storage(e.to_string()))?;
            change(&mut credentials);
            credentials.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(credentials).map_err(|e| AuthError::Storage(e.to_string()))?;
        fs::write(path, content).map_err(|e| AuthError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        if let Ok(mut credentials) = self.credentials.write() {
            *credentials = Credentials::default();
        }
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path).map_err(|e| AuthError::Storage(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Talks to the token and userinfo endpoints and records what they grant
#[derive(Debug, Clone)]
struct TokenClient {
    http: reqwest::Client,
    settings: OAuthSettings,
    store: CredentialStore,
}

impl TokenClient {
    fn cached_token(&self, key: &str) -> Option<AccessToken> {
        self.store
            .read(|c| {
                c.tokens
                    .get(key)
                    .filter(|t| t.is_fresh(Utc::now()))
                    .map(|t| AccessToken::new(t.access_token.clone()))
            })
            .flatten()
    }

    fn refresh_token(&self) -> Option<String> {
        self.store.read(|c| c.refresh_token.clone()).flatten()
    }

    async fn fetch_user(&self, token: &AccessToken) -> Option<UserProfile> {
        let response = self
            .http
            .get(self.settings.endpoint("/userinfo"))
            .bearer_auth(token.secret())
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<UserProfile>().await.ok()
    }

    /// POST a grant to the token endpoint
    async fn request_token(
        &self,
        body: serde_json::Value,
        fallback: &str,
        failed: fn(String) -> AuthError,
    ) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(self.settings.endpoint("/oauth/token"))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let reason = response
                .json::<OAuthErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error_description.or(b.error))
                .unwrap_or_else(|| fallback.to_string());
            return Err(failed(reason));
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| failed(e.to_string()))
    }

    async fn refresh(&self, params: &TokenParams, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let mut body = serde_json::json!({
            "grant_type": "refresh_token",
            "client_id": self.settings.client_id,
            "refresh_token": refresh_token,
            "scope": params.scope,
        });
        if let Some(audience) = &params.audience {
            body["audience"] = serde_json::Value::String(audience.clone());
        }
        let granted = self
            .request_token(body, "refresh token rejected", AuthError::RefreshFailed)
            .await?;
        let needs_user = self.store.read(|c| c.user.is_none()).unwrap_or(true);
        self.record(granted, Some(params.cache_key()), needs_user).await
    }

    /// Trade an authorization code for tokens; a new login always refetches the user
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        verifier: &str,
        params: Option<&TokenParams>,
    ) -> Result<AccessToken, AuthError> {
        debug!("Exchanging authorization code for tokens");
        let body = serde_json::json!({
            "grant_type": "authorization_code",
            "client_id": self.settings.client_id,
            "code": code,
            "redirect_uri": redirect_uri,
            "code_verifier": verifier,
        });
        let granted = self
            .request_token(body, "authorization code rejected", AuthError::LoginFailed)
            .await?;
        self.record(granted, params.map(TokenParams::cache_key), true)
            .await
    }

    async fn record(
        &self,
        granted: TokenResponse,
        cache_key: Option<String>,
        fetch_user: bool,
    ) -> Result<AccessToken, AuthError> {
        let token = AccessToken::new(granted.access_token.clone());
        let user = if fetch_user {
            self.fetch_user(&token).await
        } else {
            None
        };
        let stored = self.store.update(|credentials| {
            if let Some(key) = cache_key {
                credentials.tokens.insert(
                    key,
                    CachedToken {
                        access_token: granted.access_token,
                        expires_at: Utc::now() + Duration::seconds(granted.expires_in),
                    },
                );
            }
            if let Some(rotated) = granted.refresh_token {
                credentials.refresh_token = Some(rotated);
            }
            if user.is_some() {
                credentials.user = user;
            }
        });
        if let Err(err) = stored {
            warn!("Could not persist credentials: {err}");
        }
        Ok(token)
    }
}

/// Scope for the authorize request, always asking for a refresh token
fn login_scope(params: Option<&TokenParams>) -> String {
    let scope = params.map(|p| p.scope.as_str()).unwrap_or(LOGIN_SCOPE);
    if scope.split_whitespace().any(|s| s == OFFLINE_ACCESS) {
        scope.to_string()
    } else {
        format!("{scope} {OFFLINE_ACCESS}")
    }
}

pub struct OAuthProvider {
    client: TokenClient,
    pending: Mutex<Option<PendingRedirect>>,
    completed: Arc<Mutex<Option<CompletedLogin>>>,
    active_login: Mutex<Option<CancellationToken>>,
}

impl OAuthProvider {
    /// Create a provider, restoring credentials from `cache_path` if present
    pub fn new(settings: OAuthSettings, cache_path: Option<PathBuf>) -> Self {
        Self {
            client: TokenClient {
                http: reqwest::Client::new(),
                settings,
                store: CredentialStore::load(cache_path),
            },
            pending: Mutex::new(None),
            completed: Arc::new(Mutex::new(None)),
            active_login: Mutex::new(None),
        }
    }

    /// Take the redirect started by the last interactive login, if any
    pub fn take_pending_redirect(&self) -> Option<PendingRedirect> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }

    /// Take the result of a browser sign-in that has finished
    pub fn take_completed_login(&self) -> Option<CompletedLogin> {
        self.completed.lock().ok().and_then(|mut c| c.take())
    }

    /// Abandon the browser sign-in in progress
    pub fn cancel_login(&self) {
        if let Some(token) = self.active_login.lock().ok().and_then(|mut t| t.take()) {
            debug!("Sign-in cancelled");
            token.cancel();
        }
        self.take_pending_redirect();
    }

    /// Cancel any earlier sign-in and hand out a token for the next one
    fn restart_login(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Ok(mut active) = self.active_login.lock() {
            if let Some(previous) = active.replace(token.clone()) {
                previous.cancel();
            }
        }
        token
    }

    /// Build the authorize URL for an interactive login
    pub fn authorize_url(
        &self,
        options: &RedirectOptions,
        redirect_uri: &str,
        state: &str,
        pkce: &Pkce,
    ) -> Result<String, AuthError> {
        let settings = &self.client.settings;
        let mut query = vec![
            ("response_type", "code".to_string()),
            ("client_id", settings.client_id.clone()),
            ("redirect_uri", redirect_uri.to_string()),
            ("state", state.to_string()),
            ("code_challenge", pkce.challenge.clone()),
            ("code_challenge_method", "S256".to_string()),
            ("scope", login_scope(options.params.as_ref())),
        ];
        if let Some(audience) = options.params.as_ref().and_then(|p| p.audience.clone()) {
            query.push(("audience", audience));
        }
        if let Some(prompt) = options.prompt {
            query.push(("prompt", prompt.as_str().to_string()));
        }
        Url::parse_with_params(&settings.endpoint("/authorize"), &query)
            .map(String::from)
            .map_err(|e| AuthError::Network(format!("invalid identity provider domain: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn is_authenticated(&self) -> bool {
        self.client
            .store
            .read(|c| {
                c.refresh_token.is_some() || c.tokens.values().any(|t| t.is_fresh(Utc::now()))
            })
            .unwrap_or(false)
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn user(&self) -> Option<UserProfile> {
        self.client.store.read(|c| c.user.clone()).flatten()
    }

    async fn get_token_silently(&self, params: &TokenParams) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.client.cached_token(&params.cache_key()) {
            return Ok(token);
        }
        let refresh_token = self.client.refresh_token().ok_or(AuthError::LoginRequired)?;
        debug!("Refreshing access token for {}", params.cache_key());
        self.client.refresh(params, &refresh_token).await
    }

    async fn login_with_redirect(&self, options: RedirectOptions) -> Result<(), AuthError> {
        let pkce = Pkce::generate()?;
        let nonce = generate_state()?;
        let server = CallbackServer::bind(self.client.settings.callback_port, nonce.clone()).await?;
        let redirect_uri = server.redirect_uri().to_string();
        let url = self.authorize_url(&options, &redirect_uri, &nonce, &pkce)?;

        let cancel = self.restart_login();
        let client = self.client.clone();
        let completed = Arc::clone(&self.completed);
        let RedirectOptions {
            params, return_to, ..
        } = options;
        info!("Interactive login required, continuing at {return_to}");

        let task_return_to = return_to.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                code = server.wait_for_code(LOGIN_TIMEOUT) => match code {
                    Ok(code) => client
                        .exchange_code(&code, &redirect_uri, &pkce.verifier, params.as_ref())
                        .await
                        .map(|_| ()),
                    Err(err) => Err(err),
                },
            };
            if cancel.is_cancelled() {
                return;
            }
            match &result {
                Ok(()) => info!("Signed in"),
                Err(err) => warn!("Sign-in failed: {err}"),
            }
            if let Ok(mut slot) = completed.lock() {
                *slot = Some(CompletedLogin {
                    return_to: task_return_to,
                    result,
                });
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(PendingRedirect { url, return_to });
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.cancel_login();
        self.client.store.clear()
    }
}
