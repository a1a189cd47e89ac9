//! Collaborator traits.
//!
//! Everything the core delegates to a managed service lives behind one of
//! these traits: authentication, document storage, key-value persistence,
//! and push messaging. The traits describe the contracts the core relies
//! on; the hosted implementations live outside this crate, and
//! [`memory`] provides in-memory versions for tests and local development.
//!
//! Live change-streams are handed out as [`Subscription`]s: a receiver
//! paired with an RAII guard that releases the provider-side registration
//! when the owning scope ends, on every exit path.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use plateful_core::{DocumentId, Email, SessionToken, UserId};

/// Failure from an external collaborator.
///
/// The taxonomy is deliberately shallow: the core never retries and never
/// interprets collaborator failures beyond surfacing them, so one opaque
/// message-carrying error is enough.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Wrap a collaborator failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Change streams
// =============================================================================

/// A live change-stream from a collaborator.
///
/// Holds the receiving end of the stream plus a guard that notifies the
/// provider when the subscription is dropped. Dropping the subscription is
/// the only way to unsubscribe, which makes release automatic on every
/// exit path of the owning scope.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    _guard: SubscriptionGuard,
}

impl<T> Subscription<T> {
    /// Pair a receiver with its release guard.
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<T>, guard: SubscriptionGuard) -> Self {
        Self { rx, _guard: guard }
    }

    /// Receive the next event, or `None` once the provider side closes.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receive without waiting. Used by synchronous call sites that only
    /// want events already delivered.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// RAII release handle for a [`Subscription`].
///
/// Runs its release hook exactly once, when dropped.
pub struct SubscriptionGuard {
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    /// Create a guard that runs `on_release` when dropped.
    #[must_use]
    pub fn new(on_release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_release: Some(Box::new(on_release)),
        }
    }

    /// A guard with no release hook, for providers that only rely on the
    /// receiver being dropped.
    #[must_use]
    pub const fn noop() -> Self {
        Self { on_release: None }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

// =============================================================================
// Authentication provider
// =============================================================================

/// An established session as reported by the authentication provider.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: UserId,
    pub token: SessionToken,
}

/// A session transition emitted by the provider's live stream.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user signed in; carries the session token.
    Established(SessionToken),
    /// The session ended (sign-out or provider-side invalidation).
    Cleared,
}

/// Sign-in failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignInError {
    /// Unknown user or wrong password. The provider does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Any other provider failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Sign-up failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignUpError {
    /// The email address is already registered.
    #[error("email already in use")]
    EmailInUse,
    /// The provider rejected the email address as malformed.
    #[error("invalid email address")]
    InvalidEmail,
    /// Any other provider failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// The hosted authentication backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate with email and password.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, SignInError>;

    /// Register a new account and sign it in.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, SignUpError>;

    /// End the current session. Emits [`SessionEvent::Cleared`] on the
    /// live stream.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Subscribe to session transitions. At most one subscription should
    /// be live per session gate.
    fn subscribe_session_changes(&self) -> Subscription<SessionEvent>;
}

// =============================================================================
// Document store
// =============================================================================

/// Path to a collection of documents in the hosted store.
///
/// Constructors mirror the backend's layout: user profiles live at
/// `users`, and each user's menu at `users/{uid}/menu`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// The user-profile collection.
    #[must_use]
    pub fn users() -> Self {
        Self("users".to_owned())
    }

    /// A user's menu collection.
    #[must_use]
    pub fn user_menu(user_id: &UserId) -> Self {
        Self(format!("users/{user_id}/menu"))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document: its id plus arbitrary JSON data.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub data: Value,
}

/// The hosted document database.
///
/// Every read the core performs is a live subscription; every write is an
/// immediate remote call. No local caching or conflict resolution.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document with a store-assigned id.
    async fn add(&self, collection: &CollectionPath, data: Value)
    -> Result<DocumentId, ProviderError>;

    /// Create or replace the document at `id`.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        data: Value,
    ) -> Result<(), ProviderError>;

    /// Shallow-merge `patch` into the document at `id`.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        patch: Value,
    ) -> Result<(), ProviderError>;

    /// Delete the document at `id`.
    async fn delete(&self, collection: &CollectionPath, id: &DocumentId)
    -> Result<(), ProviderError>;

    /// Fetch one document.
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> Result<Option<Document>, ProviderError>;

    /// Subscribe to a collection. Emits the full current snapshot
    /// immediately and again on every change.
    fn watch(&self, collection: &CollectionPath) -> Subscription<Vec<Document>>;
}

// =============================================================================
// Key-value persistence
// =============================================================================

/// Local device persistence.
///
/// Used only as a best-effort cache for the session token and an opaque
/// user-data blob; never a source of truth.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, ProviderError>;

    /// Write a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), ProviderError>;

    /// Remove a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), ProviderError>;

    /// Remove everything.
    async fn clear(&self) -> Result<(), ProviderError>;
}

// =============================================================================
// Push messaging
// =============================================================================

/// A push message as delivered by the messaging service.
///
/// The core forwards `title` and `body` to the local-notification display
/// and never interprets `data`.
#[derive(Debug, Clone, Default)]
pub struct PushMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Value,
}

/// The push-message delivery pipeline.
#[async_trait]
pub trait PushSource: Send + Sync {
    /// Subscribe to incoming messages.
    fn subscribe_messages(&self) -> Subscription<PushMessage>;

    /// The device registration token for this installation.
    async fn registration_token(&self) -> Result<String, ProviderError>;

    /// Ask the platform for notification permission. Returns whether it
    /// was granted.
    async fn request_permission(&self) -> Result<bool, ProviderError>;
}

/// A notification channel, created once before anything is displayed.
#[derive(Debug, Clone)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A notification to display locally.
#[derive(Debug, Clone)]
pub struct LocalNotification {
    pub channel_id: String,
    pub title: String,
    pub body: String,
}

/// The local-notification display.
#[async_trait]
pub trait LocalNotifier: Send + Sync {
    /// Make sure the channel exists. Idempotent.
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<(), ProviderError>;

    /// Display a notification.
    async fn display(&self, notification: &LocalNotification) -> Result<(), ProviderError>;
}
