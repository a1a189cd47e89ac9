//! In-memory collaborator implementations.
//!
//! These back the test suites and local development. They honor the same
//! contracts as the hosted services: the auth provider emits session events
//! on its live stream, the document store fans out a full snapshot on every
//! change, and the key-value store can be told to fail reads or writes to
//! exercise best-effort persistence paths.
//!
//! All state sits behind `std::sync::Mutex`; locks are never held across
//! an await point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use plateful_core::{DocumentId, Email, SessionToken, UserId};

use super::{
    AuthProvider, AuthSession, CollectionPath, Document, DocumentStore, KeyValueStore,
    LocalNotification, LocalNotifier, NotificationChannel, ProviderError, PushMessage, PushSource,
    SessionEvent, SignInError, SignUpError, Subscription, SubscriptionGuard,
};

/// Locks a mutex, recovering from poisoning.
///
/// Test-double state is safe to reuse after a panicking test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Fan-out registry for one event stream.
///
/// Tracks how many subscriptions are live so tests can assert that every
/// scope released its stream.
struct Listeners<T> {
    senders: Mutex<Vec<mpsc::UnboundedSender<T>>>,
    live: Arc<AtomicUsize>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Listeners<T> {
    fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        Subscription::new(rx, self.register(tx))
    }

    fn register(&self, tx: mpsc::UnboundedSender<T>) -> SubscriptionGuard {
        lock(&self.senders).push(tx);
        self.live.fetch_add(1, Ordering::SeqCst);
        let live = Arc::clone(&self.live);
        SubscriptionGuard::new(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl<T: Clone> Listeners<T> {
    /// Subscribe and deliver `initial` to the new subscriber only.
    fn subscribe_with_initial(&self, initial: &T) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(initial.clone()).ok();
        Subscription::new(rx, self.register(tx))
    }

    fn broadcast(&self, event: &T) {
        // Prune listeners whose receiving end is gone.
        lock(&self.senders).retain(|tx| tx.send(event.clone()).is_ok());
    }
}

// =============================================================================
// Auth provider
// =============================================================================

struct RegisteredUser {
    user_id: UserId,
    password: String,
}

/// In-memory [`AuthProvider`].
#[derive(Default)]
pub struct MemoryAuthProvider {
    users: Mutex<HashMap<String, RegisteredUser>>,
    current: Mutex<Option<AuthSession>>,
    listeners: Listeners<SessionEvent>,
}

impl MemoryAuthProvider {
    /// An empty provider with no registered users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a known user.
    #[must_use]
    pub fn with_user(self, email: &Email, password: &str) -> Self {
        lock(&self.users).insert(
            email.as_str().to_owned(),
            RegisteredUser {
                user_id: UserId::new(format!("uid-{}", Uuid::new_v4())),
                password: password.to_owned(),
            },
        );
        self
    }

    /// Inject a session event directly, bypassing sign-in/sign-out.
    ///
    /// Lets tests model provider-side transitions such as remote session
    /// invalidation or out-of-order delivery.
    pub fn emit(&self, event: SessionEvent) {
        self.listeners.broadcast(&event);
    }

    /// How many session-change subscriptions are currently live.
    #[must_use]
    pub fn live_subscriptions(&self) -> usize {
        self.listeners.live_count()
    }

    fn establish(&self, user_id: UserId) -> AuthSession {
        let session = AuthSession {
            token: SessionToken::new(user_id.as_str()),
            user_id,
        };
        *lock(&self.current) = Some(session.clone());
        self.listeners
            .broadcast(&SessionEvent::Established(session.token.clone()));
        session
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, SignInError> {
        let user_id = {
            let users = lock(&self.users);
            let user = users
                .get(email.as_str())
                .ok_or(SignInError::InvalidCredentials)?;
            if user.password != password {
                return Err(SignInError::InvalidCredentials);
            }
            user.user_id.clone()
        };
        Ok(self.establish(user_id))
    }

    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, SignUpError> {
        let user_id = UserId::new(format!("uid-{}", Uuid::new_v4()));
        {
            let mut users = lock(&self.users);
            if users.contains_key(email.as_str()) {
                return Err(SignUpError::EmailInUse);
            }
            users.insert(
                email.as_str().to_owned(),
                RegisteredUser {
                    user_id: user_id.clone(),
                    password: password.to_owned(),
                },
            );
        }
        Ok(self.establish(user_id))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        *lock(&self.current) = None;
        self.listeners.broadcast(&SessionEvent::Cleared);
        Ok(())
    }

    fn current_user(&self) -> Option<UserId> {
        lock(&self.current).as_ref().map(|s| s.user_id.clone())
    }

    fn subscribe_session_changes(&self) -> Subscription<SessionEvent> {
        self.listeners.subscribe()
    }
}

// =============================================================================
// Document store
// =============================================================================

/// In-memory [`DocumentStore`] with insertion-ordered collections.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<(DocumentId, Value)>>>,
    watchers: Mutex<HashMap<String, Arc<Listeners<Vec<Document>>>>>,
}

impl MemoryDocumentStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many watch subscriptions are live for `collection`.
    #[must_use]
    pub fn live_watchers(&self, collection: &CollectionPath) -> usize {
        lock(&self.watchers)
            .get(collection.as_str())
            .map_or(0, |l| l.live_count())
    }

    fn snapshot_of(&self, collection: &str) -> Vec<Document> {
        lock(&self.collections)
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn notify(&self, collection: &str) {
        let listeners = lock(&self.watchers).get(collection).map(Arc::clone);
        if let Some(listeners) = listeners {
            listeners.broadcast(&self.snapshot_of(collection));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<DocumentId, ProviderError> {
        let id = DocumentId::new(Uuid::new_v4().to_string());
        lock(&self.collections)
            .entry(collection.as_str().to_owned())
            .or_default()
            .push((id.clone(), data));
        self.notify(collection.as_str());
        Ok(id)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        data: Value,
    ) -> Result<(), ProviderError> {
        {
            let mut collections = lock(&self.collections);
            let docs = collections.entry(collection.as_str().to_owned()).or_default();
            if let Some(slot) = docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
                slot.1 = data;
            } else {
                docs.push((id.clone(), data));
            }
        }
        self.notify(collection.as_str());
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        patch: Value,
    ) -> Result<(), ProviderError> {
        {
            let mut collections = lock(&self.collections);
            let docs = collections
                .get_mut(collection.as_str())
                .ok_or_else(|| ProviderError::new(format!("no such document: {id}")))?;
            let slot = docs
                .iter_mut()
                .find(|(doc_id, _)| doc_id == id)
                .ok_or_else(|| ProviderError::new(format!("no such document: {id}")))?;
            shallow_merge(&mut slot.1, patch);
        }
        self.notify(collection.as_str());
        Ok(())
    }

    async fn delete(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> Result<(), ProviderError> {
        {
            let mut collections = lock(&self.collections);
            if let Some(docs) = collections.get_mut(collection.as_str()) {
                docs.retain(|(doc_id, _)| doc_id != id);
            }
        }
        self.notify(collection.as_str());
        Ok(())
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> Result<Option<Document>, ProviderError> {
        Ok(self
            .snapshot_of(collection.as_str())
            .into_iter()
            .find(|doc| &doc.id == id))
    }

    fn watch(&self, collection: &CollectionPath) -> Subscription<Vec<Document>> {
        let listeners = Arc::clone(
            lock(&self.watchers)
                .entry(collection.as_str().to_owned())
                .or_insert_with(|| Arc::new(Listeners::new())),
        );
        // Contract: the full current snapshot is delivered immediately,
        // to the new subscriber only.
        listeners.subscribe_with_initial(&self.snapshot_of(collection.as_str()))
    }
}

/// Merge the top-level keys of `patch` into `target`.
fn shallow_merge(target: &mut Value, patch: Value) {
    match (target.as_object_mut(), patch) {
        (Some(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (_, patch) => *target = patch,
    }
}

// =============================================================================
// Key-value persistence
// =============================================================================

/// In-memory [`KeyValueStore`] with failure injection.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of a persisted value.
    #[must_use]
    pub fn with_value(self, key: &str, value: &str) -> Self {
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        self
    }

    /// Make every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write (set/remove/clear) fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct read for assertions, bypassing failure injection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn check_write(&self) -> Result<(), ProviderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::new("persistence write failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ProviderError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::new("persistence read failed"));
        }
        Ok(lock(&self.values).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ProviderError> {
        self.check_write()?;
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ProviderError> {
        self.check_write()?;
        lock(&self.values).remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProviderError> {
        self.check_write()?;
        lock(&self.values).clear();
        Ok(())
    }
}

// =============================================================================
// Push messaging
// =============================================================================

/// In-memory [`PushSource`].
pub struct MemoryPushSource {
    listeners: Listeners<PushMessage>,
    permission_granted: AtomicBool,
}

impl Default for MemoryPushSource {
    fn default() -> Self {
        Self {
            listeners: Listeners::new(),
            permission_granted: AtomicBool::new(true),
        }
    }
}

impl MemoryPushSource {
    /// A source that grants notification permission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Control the answer to [`PushSource::request_permission`].
    pub fn set_permission_granted(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    /// Deliver a message to all subscribers.
    pub fn push(&self, message: PushMessage) {
        self.listeners.broadcast(&message);
    }

    /// How many message subscriptions are live.
    #[must_use]
    pub fn live_subscriptions(&self) -> usize {
        self.listeners.live_count()
    }
}

#[async_trait]
impl PushSource for MemoryPushSource {
    fn subscribe_messages(&self) -> Subscription<PushMessage> {
        self.listeners.subscribe()
    }

    async fn registration_token(&self) -> Result<String, ProviderError> {
        Ok("memory-registration-token".to_owned())
    }

    async fn request_permission(&self) -> Result<bool, ProviderError> {
        Ok(self.permission_granted.load(Ordering::SeqCst))
    }
}

/// In-memory [`LocalNotifier`] that records what it was asked to display.
#[derive(Default)]
pub struct MemoryNotifier {
    channels: Mutex<Vec<NotificationChannel>>,
    displayed: Mutex<Vec<LocalNotification>>,
}

impl MemoryNotifier {
    /// A notifier with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification displayed so far, in order.
    #[must_use]
    pub fn displayed(&self) -> Vec<LocalNotification> {
        lock(&self.displayed).clone()
    }

    /// Ids of channels created so far.
    #[must_use]
    pub fn channel_ids(&self) -> Vec<String> {
        lock(&self.channels).iter().map(|c| c.id.clone()).collect()
    }
}

#[async_trait]
impl LocalNotifier for MemoryNotifier {
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<(), ProviderError> {
        let mut channels = lock(&self.channels);
        if !channels.iter().any(|c| c.id == channel.id) {
            channels.push(channel.clone());
        }
        Ok(())
    }

    async fn display(&self, notification: &LocalNotification) -> Result<(), ProviderError> {
        lock(&self.displayed).push(notification.clone());
        Ok(())
    }
}
