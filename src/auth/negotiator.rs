//! Two-stage token acquisition: silent first, interactive consent second

use super::provider::{AccessToken, AuthError, Prompt, RedirectOptions, SessionHandle, TokenParams};
use crate::state::Route;
use tracing::{debug, warn};

/// Result of asking for a token on behalf of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Granted(AccessToken),
    /// A consent redirect was started; the submission is suspended
    Redirected,
}

/// Wraps the identity provider's silent and interactive operations
#[derive(Debug, Clone)]
pub struct TokenNegotiator {
    session: SessionHandle,
}

impl TokenNegotiator {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Get a token for a write. If silent acquisition fails the provider is
    /// sent into an interactive consent flow that returns to `return_to`.
    pub async fn acquire(
        &self,
        params: &TokenParams,
        return_to: &Route,
    ) -> Result<Acquisition, AuthError> {
        let provider = self.session.provider();
        match provider.get_token_silently(params).await {
            Ok(token) => Ok(Acquisition::Granted(token)),
            Err(err) => {
                warn!("Silent token acquisition failed, requesting consent: {err}");
                provider
                    .login_with_redirect(RedirectOptions {
                        params: Some(params.clone()),
                        prompt: Some(Prompt::Consent),
                        return_to: return_to.path(),
                    })
                    .await?;
                Ok(Acquisition::Redirected)
            }
        }
    }

    /// Get a token for a read. Failure is not fatal: the read goes out
    /// without a bearer header.
    pub async fn acquire_optional(&self, params: &TokenParams) -> Option<AccessToken> {
        match self.session.provider().get_token_silently(params).await {
            Ok(token) => Some(token),
            Err(err) => {
                debug!("Proceeding without a token: {err}");
                None
            }
        }
    }

    /// Plain login redirect for a user with no session at all
    pub async fn login(&self, return_to: &Route) -> Result<(), AuthError> {
        self.session
            .provider()
            .login_with_redirect(RedirectOptions {
                params: None,
                prompt: None,
                return_to: return_to.path(),
            })
            .await
    }
}
