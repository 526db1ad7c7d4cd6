//! Bearer-token storage shared between the gateway and the session machine.
//!
//! The store is the one place the global unauthorized side effect lands:
//! when any request comes back 401 the gateway calls [`TokenStore::revoke`],
//! which drops the token and bumps a revocation generation observable
//! through a watch channel. The session state machine folds pending
//! revocations into its state; other components may subscribe directly.

use std::sync::RwLock;
use tokio::sync::watch;

/// Shared bearer-token store with a session-revoked broadcast.
#[derive(Debug)]
pub struct TokenStore {
    // Held only for short synchronous sections, never across an await
    token: RwLock<Option<String>>,
    revocations: watch::Sender<u64>,
}

impl TokenStore {
    pub fn new() -> Self {
        let (revocations, _) = watch::channel(0);
        Self {
            token: RwLock::new(None),
            revocations,
        }
    }

    /// Install a token after a successful authentication.
    pub fn set(&self, token: String) {
        *self.token.write().expect("token lock poisoned") = Some(token);
        tracing::debug!("Bearer token installed");
    }

    /// Drop the token without signaling revocation (explicit logout).
    pub fn clear(&self) {
        *self.token.write().expect("token lock poisoned") = None;
        tracing::debug!("Bearer token cleared");
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    pub fn is_present(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// Tear the session down after an unauthorized response. Clears the
    /// token and notifies every subscriber, regardless of which component
    /// triggered the offending call.
    pub fn revoke(&self) {
        *self.token.write().expect("token lock poisoned") = None;
        self.revocations.send_modify(|generation| *generation += 1);
        tracing::warn!("Session revoked by unauthorized response");
    }

    /// Monotonic count of revocations since the store was created.
    pub fn revocation_generation(&self) -> u64 {
        *self.revocations.borrow()
    }

    /// Subscribe to revocation events.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revocations.subscribe()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}
