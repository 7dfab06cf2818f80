//! Loopback callback server for the browser sign-in
//!
//! The provider redirects the browser to `http://localhost:<port>/callback`
//! with an authorization code and the state nonce sent in the authorize
//! request. A callback carrying any other state is refused.

use super::provider::AuthError;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const CALLBACK_PATH: &str = "/callback";

/// Time the browser gets to fetch the result page before the server stops
const RESPONSE_GRACE: Duration = Duration::from_millis(500);

/// PKCE verifier and its S256 challenge
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Result<Self, AuthError> {
        Ok(Self::from_verifier(random_token(64)?))
    }

    fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// Random nonce for the `state` parameter
pub fn generate_state() -> Result<String, AuthError> {
    random_token(32)
}

fn random_token(len: usize) -> Result<String, AuthError> {
    let mut buf = vec![0u8; len];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AuthError::LoginFailed(format!("no randomness available: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

type CodeSender = oneshot::Sender<Result<String, String>>;

#[derive(Clone)]
struct CallbackState {
    code_tx: Arc<Mutex<Option<CodeSender>>>,
    expected_state: String,
}

impl CallbackState {
    /// Only the first callback counts
    fn deliver(&self, result: Result<String, String>) {
        if let Some(tx) = self.code_tx.lock().ok().and_then(|mut tx| tx.take()) {
            let _ = tx.send(result);
        }
    }
}

/// A listener on the loopback interface waiting for one provider redirect
pub struct CallbackServer {
    redirect_uri: String,
    code_rx: oneshot::Receiver<Result<String, String>>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    /// Listen on `127.0.0.1:port`; port 0 picks a free one
    pub async fn bind(port: u16, expected_state: String) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.map_err(|e| {
            AuthError::LoginFailed(format!("cannot listen for the callback on port {port}: {e}"))
        })?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::LoginFailed(e.to_string()))?
            .port();
        let redirect_uri = format!("http://localhost:{port}{CALLBACK_PATH}");

        let (code_tx, code_rx) = oneshot::channel();
        let router = Router::new()
            .route(CALLBACK_PATH, get(callback_handler))
            .with_state(CallbackState {
                code_tx: Arc::new(Mutex::new(Some(code_tx))),
                expected_state,
            });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                warn!("Callback server stopped: {e}");
            }
        });
        debug!("Waiting for the sign-in callback at {redirect_uri}");

        Ok(Self {
            redirect_uri,
            code_rx,
            shutdown_tx,
            handle,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Wait for the authorization code, then stop listening.
    ///
    /// Dropping the future also stops the server.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String, AuthError> {
        let Self {
            code_rx,
            shutdown_tx,
            handle,
            ..
        } = self;
        let received = tokio::time::timeout(timeout, code_rx).await;
        if received.is_ok() {
            tokio::time::sleep(RESPONSE_GRACE).await;
        }
        let _ = shutdown_tx.send(());
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;

        match received {
            Ok(Ok(Ok(code))) => Ok(code),
            Ok(Ok(Err(reason))) => Err(AuthError::LoginFailed(reason)),
            Ok(Err(_)) => Err(AuthError::LoginFailed("callback channel closed".to_string())),
            Err(_) => Err(AuthError::LoginFailed(format!(
                "no callback within {}s",
                timeout.as_secs()
            ))),
        }
    }
}

async fn callback_handler(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .cloned()
            .unwrap_or_else(|| error.clone());
        state.deliver(Err(description.clone()));
        return Html(error_html(&description));
    }

    if params.get("state") != Some(&state.expected_state) {
        let message = "state mismatch in callback".to_string();
        state.deliver(Err(message.clone()));
        return Html(error_html(&message));
    }

    match params.get("code") {
        Some(code) => {
            state.deliver(Ok(code.clone()));
            Html(success_html())
        }
        None => {
            let message = "missing authorization code in callback".to_string();
            state.deliver(Err(message.clone()));
            Html(error_html(&message))
        }
    }
}

fn page(heading: &str, color: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Folio</title></head>
<body style="font-family:sans-serif;display:flex;justify-content:center;align-items:center;height:100vh;margin:0;">
<div style="text-align:center;padding:3rem;">
  <h1 style="color:{color};">{heading}</h1>
  {body}
</div>
</body>
</html>"#
    )
}

fn success_html() -> String {
    page(
        "Signed in",
        "#22c55e",
        "<p>You can close this tab and return to the terminal.</p>",
    )
}

fn error_html(error: &str) -> String {
    let escaped = error
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    page(
        "Sign-in failed",
        "#ef4444",
        &format!("<p>{escaped}</p><p>Close this tab and try again from the terminal.</p>"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn visit(server: &CallbackServer, query: &[(&str, &str)]) -> String {
        reqwest::Client::new()
            .get(server.redirect_uri())
            .query(query)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    #[test]
    fn test_pkce_challenge_is_s256_of_verifier() {
        let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_generated_values_are_url_safe_and_distinct() {
        let a = generate_state().unwrap();
        let b = generate_state().unwrap();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        let pkce = Pkce::generate().unwrap();
        assert!(pkce.verifier.len() >= 43);
    }

    #[tokio::test]
    async fn test_callback_delivers_code() {
        let server = CallbackServer::bind(0, "nonce-1".to_string()).await.unwrap();
        assert!(server.redirect_uri().starts_with("http://localhost:"));
        assert!(server.redirect_uri().ends_with(CALLBACK_PATH));

        let page = visit(&server, &[("code", "abc"), ("state", "nonce-1")]).await;
        assert!(page.contains("Signed in"));

        let code = server.wait_for_code(Duration::from_secs(5)).await;
        assert_eq!(code, Ok("abc".to_string()));
    }

    #[tokio::test]
    async fn test_callback_with_foreign_state_is_refused() {
        let server = CallbackServer::bind(0, "nonce-1".to_string()).await.unwrap();
        let page = visit(&server, &[("code", "abc"), ("state", "/project/create")]).await;
        assert!(page.contains("Sign-in failed"));

        let code = server.wait_for_code(Duration::from_secs(5)).await;
        assert_eq!(
            code,
            Err(AuthError::LoginFailed("state mismatch in callback".to_string()))
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let server = CallbackServer::bind(0, "nonce-1".to_string()).await.unwrap();
        visit(
            &server,
            &[
                ("error", "access_denied"),
                ("error_description", "User cancelled"),
                ("state", "nonce-1"),
            ],
        )
        .await;
        let code = server.wait_for_code(Duration::from_secs(5)).await;
        assert_eq!(code, Err(AuthError::LoginFailed("User cancelled".to_string())));
    }

    #[tokio::test]
    async fn test_no_callback_times_out() {
        let server = CallbackServer::bind(0, "nonce-1".to_string()).await.unwrap();
        let code = server.wait_for_code(Duration::from_millis(50)).await;
        assert!(matches!(code, Err(AuthError::LoginFailed(_))));
    }
}
