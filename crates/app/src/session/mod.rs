//! Session gate.
//!
//! Decides which of two mutually exclusive screen groups is reachable and
//! keeps that decision synchronized with the authentication provider's
//! live session stream. The gate is a three-state machine:
//!
//! - `Unresolved` - the startup token check has not completed; the
//!   navigation layer renders nothing.
//! - `Authenticated` - the signed-in screen group is reachable.
//! - `Unauthenticated` - the sign-in/sign-up screen group is reachable.
//!
//! The machine never terminates; it keeps reacting to provider events for
//! the lifetime of the process. Each incoming event fully overwrites the
//! current resolved state, so the last applied event wins regardless of
//! how many were in flight.
//!
//! The persisted token is a best-effort cache, not a source of truth:
//! persistence failures during save/clear are logged and never fail the
//! in-memory transition.

use std::sync::Arc;

use tokio::sync::watch;

use plateful_core::SessionToken;

use crate::providers::{KeyValueStore, SessionEvent, Subscription};

/// Keys used in local key-value persistence.
pub mod storage_keys {
    /// Key under which the session token is cached.
    pub const SESSION_TOKEN: &str = "token";

    /// Key under which the opaque user-data blob is cached.
    pub const USER_DATA: &str = "user_data";
}

/// The gate's authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The initial token check has not completed.
    Unresolved,
    /// A session is established.
    Authenticated(SessionToken),
    /// No session.
    Unauthenticated,
}

impl SessionState {
    /// Whether the initial check has completed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// The two mutually exclusive screen groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGroup {
    /// Signed-in screens (home, menu management).
    Main,
    /// Sign-in and sign-up screens.
    Auth,
}

/// The session gate.
///
/// State transitions are observable through a watch channel; the
/// navigation layer calls [`SessionGate::subscribe`] once and re-renders
/// on every change.
pub struct SessionGate {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionGate {
    /// A gate in the `Unresolved` state.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unresolved);
        Self { state, storage }
    }

    /// Complete the startup check by reading any previously cached token.
    ///
    /// Present token: `Authenticated` (pending confirmation from the live
    /// stream). Absent token: `Unauthenticated`. A failed read is treated
    /// as absent; the cache is best-effort.
    pub async fn resolve(&self) {
        let token = match self.storage.get(storage_keys::SESSION_TOKEN).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "token read failed during startup check");
                None
            }
        };

        let next = token.map_or(SessionState::Unauthenticated, |t| {
            SessionState::Authenticated(SessionToken::new(t))
        });
        tracing::debug!(resolved_authenticated = matches!(next, SessionState::Authenticated(_)),
            "session resolved");
        self.state.send_replace(next);
    }

    /// Apply one session event from the provider stream.
    ///
    /// Persisting (or clearing) the cached token is a side effect; the
    /// in-memory transition happens regardless of persistence success.
    pub async fn apply(&self, event: SessionEvent) {
        let next = match event {
            SessionEvent::Established(token) => {
                if let Err(error) = self
                    .storage
                    .set(storage_keys::SESSION_TOKEN, token.as_str())
                    .await
                {
                    tracing::warn!(%error, "token save failed; session continues in memory");
                }
                SessionState::Authenticated(token)
            }
            SessionEvent::Cleared => {
                if let Err(error) = self.storage.remove(storage_keys::SESSION_TOKEN).await {
                    tracing::warn!(%error, "token clear failed; session cleared in memory");
                }
                SessionState::Unauthenticated
            }
        };
        self.state.send_replace(next);
    }

    /// Drive the gate from a provider subscription until the stream closes.
    ///
    /// The subscription is consumed and dropped when this returns, which
    /// releases the provider-side registration on every exit path.
    pub async fn run(&self, mut events: Subscription<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(event).await;
        }
        tracing::debug!("session stream closed");
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the startup check has completed.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state.borrow().is_resolved()
    }

    /// The screen group to render, or `None` while unresolved.
    #[must_use]
    pub fn screen_group(&self) -> Option<ScreenGroup> {
        match &*self.state.borrow() {
            SessionState::Unresolved => None,
            SessionState::Authenticated(_) => Some(ScreenGroup::Main),
            SessionState::Unauthenticated => Some(ScreenGroup::Auth),
        }
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
