//! Identity provider integration and token negotiation

mod callback;
mod negotiator;
mod oauth;
mod provider;

pub use negotiator::{Acquisition, TokenNegotiator};
pub use oauth::{CompletedLogin, OAuthProvider, OAuthSettings, PendingRedirect};
pub use provider::{AccessToken, AuthError, SessionHandle, TokenParams};

#[cfg(test)]
pub use provider::{MockIdentityProvider, Prompt};
