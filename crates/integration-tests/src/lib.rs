//! Shared fixtures for Plateful integration tests.
//!
//! Builds an [`AppState`] over the in-memory collaborators while keeping
//! the concrete handles around so tests can inject events (provider-side
//! session changes, push messages) and inspect side effects (cached
//! values, displayed notifications).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::Once;

use plateful_app::config::AppConfig;
use plateful_app::providers::memory::{
    MemoryAuthProvider, MemoryDocumentStore, MemoryKeyValueStore, MemoryNotifier,
    MemoryPushSource,
};
use plateful_app::state::AppState;
use plateful_core::Email;

static TRACING: Once = Once::new();

/// Initialize tracing once across the whole test binary.
///
/// Honors `RUST_LOG`; defaults to warn to keep test output quiet.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into());
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    });
}

/// An [`AppState`] plus direct handles to its in-memory collaborators.
pub struct Harness {
    pub state: AppState,
    pub auth: Arc<MemoryAuthProvider>,
    pub documents: Arc<MemoryDocumentStore>,
    pub storage: Arc<MemoryKeyValueStore>,
    pub push: Arc<MemoryPushSource>,
    pub notifier: Arc<MemoryNotifier>,
}

impl Harness {
    /// A harness with no registered users and empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::build(MemoryAuthProvider::new(), MemoryKeyValueStore::new())
    }

    /// A harness with one registered account.
    #[must_use]
    pub fn with_user(email: &str, password: &str) -> Self {
        let email = Email::parse(email).expect("fixture email");
        Self::build(
            MemoryAuthProvider::new().with_user(&email, password),
            MemoryKeyValueStore::new(),
        )
    }

    /// A harness with a previously cached session token.
    #[must_use]
    pub fn with_cached_token(token: &str) -> Self {
        Self::build(
            MemoryAuthProvider::new(),
            MemoryKeyValueStore::new().with_value("token", token),
        )
    }

    fn build(auth: MemoryAuthProvider, storage: MemoryKeyValueStore) -> Self {
        init_tracing();
        let auth = Arc::new(auth);
        let documents = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(storage);
        let push = Arc::new(MemoryPushSource::new());
        let notifier = Arc::new(MemoryNotifier::new());

        // Method-call clones: the concrete `Arc`s coerce to `Arc<dyn …>`
        // at the argument site.
        let state = AppState::new(
            AppConfig::for_testing(),
            auth.clone(),
            documents.clone(),
            storage.clone(),
            push.clone(),
            notifier.clone(),
        );

        Self {
            state,
            auth,
            documents,
            storage,
            push,
            notifier,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
