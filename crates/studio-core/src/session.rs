//! Session gate
//!
//! The core only reads identity from the session; signing in and out belong
//! to the collaborator. `SessionHandle` is a watch-channel backed gate usable
//! both by hosts and tests.

use crate::error::SessionError;
use crate::types::User;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Authentication status exposed to the core
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    /// Session still resolving
    #[default]
    Loading,
    /// No signed-in user
    Unauthenticated,
    /// Signed-in user present
    Authenticated(User),
}

impl GateState {
    /// Signed-in user, if any
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            GateState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Whether the session is still resolving
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, GateState::Loading)
    }
}

/// Read access to the current session
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// Current gate state
    fn state(&self) -> GateState;

    /// Signed-in user, if any
    fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    /// Whether authentication is still resolving
    fn auth_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// End the session (delegated entirely to the collaborator)
    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Watch-channel backed session gate
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<GateState>>,
}

impl SessionHandle {
    /// New gate in the `Loading` state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GateState::Loading);
        Self { tx: Arc::new(tx) }
    }

    /// New gate with a signed-in user
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        let handle = Self::new();
        handle.sign_in(user);
        handle
    }

    /// New gate with nobody signed in
    #[must_use]
    pub fn signed_out() -> Self {
        let handle = Self::new();
        handle.tx.send_replace(GateState::Unauthenticated);
        handle
    }

    /// Mark a user as signed in
    pub fn sign_in(&self, user: User) {
        tracing::info!(user = %user.id, "session signed in");
        self.tx.send_replace(GateState::Authenticated(user));
    }

    /// Subscribe to gate state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionGate for SessionHandle {
    fn state(&self) -> GateState {
        self.tx.borrow().clone()
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        tracing::info!("session signed out");
        self.tx.send_replace(GateState::Unauthenticated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User::new("U1", "u1@example.com", Utc::now())
    }

    #[test]
    fn new_handle_is_loading() {
        let session = SessionHandle::new();
        assert!(session.auth_loading());
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn sign_in_and_out() {
        let session = SessionHandle::new();
        let mut rx = session.subscribe();

        session.sign_in(user());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user().map(|u| u.id.as_str()), Some("U1"));
        assert!(!session.auth_loading());

        session.sign_out().await.unwrap();
        assert_eq!(session.state(), GateState::Unauthenticated);
        assert!(session.current_user().is_none());
    }
}
