//! Liveness tracking for asynchronous effects bound to a mounted view

use tokio_util::sync::CancellationToken;

/// Owns the cancellation tokens of one mounted view.
///
/// Each effect run gets a child token. Starting a new run cancels the previous
/// one, and tearing the scope down cancels everything. Work that finishes
/// with a cancelled token must not touch state.
#[derive(Debug)]
pub struct EffectScope {
    root: CancellationToken,
    current: Option<CancellationToken>,
}

impl Default for EffectScope {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectScope {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            current: None,
        }
    }

    /// Supersede the running effect and hand out a token for the next one
    pub fn restart(&mut self) -> CancellationToken {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        let token = self.root.child_token();
        self.current = Some(token.clone());
        token
    }

    pub fn is_live(&self) -> bool {
        !self.root.is_cancelled()
    }

    /// Unmount: nothing started from this scope may mutate state afterwards
    pub fn teardown(&mut self) {
        self.root.cancel();
        self.current = None;
    }
}

impl Drop for EffectScope {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
