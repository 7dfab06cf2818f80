//! Identity provider abstraction

use crate::state::UserProfile;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Bearer credential for the project API
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Audience and scope a token is requested for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenParams {
    pub audience: Option<String>,
    pub scope: String,
}

impl TokenParams {
    pub fn new(audience: Option<String>, scope: impl Into<String>) -> Self {
        Self {
            audience,
            scope: scope.into(),
        }
    }

    /// Cache key for tokens obtained with these parameters
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.audience.as_deref().unwrap_or(""), self.scope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Consent,
}

impl Prompt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consent => "consent",
        }
    }
}

/// Options for an interactive login redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOptions {
    pub params: Option<TokenParams>,
    pub prompt: Option<Prompt>,
    /// Route to continue at once the provider sends the user back
    pub return_to: String,
}

/// Errors from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No usable credential; the user has to go through the provider
    #[error("login required")]
    LoginRequired,

    /// The refresh credential was refused
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("identity provider unreachable: {0}")]
    Network(String),

    /// The browser sign-in did not produce a session
    #[error("sign-in failed: {0}")]
    LoginFailed(String),

    /// Credentials could not be read or written
    #[error("credential storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Identity provider operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether a user session exists
    fn is_authenticated(&self) -> bool;

    /// Whether the provider is still restoring its session
    fn is_loading(&self) -> bool;

    /// The signed-in user, if known
    fn user(&self) -> Option<UserProfile>;

    /// Obtain a token without user interaction, failing fast if impossible
    async fn get_token_silently(&self, params: &TokenParams) -> Result<AccessToken, AuthError>;

    /// Start an interactive login; the caller's flow ends here
    async fn login_with_redirect(&self, options: RedirectOptions) -> Result<(), AuthError>;

    /// Drop the local session
    async fn logout(&self) -> Result<(), AuthError>;
}

/// Explicitly passed handle to the current identity session
#[derive(Clone)]
pub struct SessionHandle {
    provider: Arc<dyn IdentityProvider>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionHandle {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn is_authenticated(&self) -> bool {
        self.provider.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.provider.is_loading()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.provider.user()
    }

    /// Subject identifier of the signed-in user
    pub fn subject(&self) -> Option<String> {
        self.provider.user().map(|u| u.sub).filter(|s| !s.is_empty())
    }
}
