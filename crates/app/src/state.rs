//! Application state shared across screens.

use std::sync::{Arc, Mutex};

use crate::cart::CartStore;
use crate::config::AppConfig;
use crate::providers::{AuthProvider, DocumentStore, KeyValueStore, LocalNotifier, PushSource};
use crate::services::{AuthService, MenuService, NotificationForwarder};
use crate::session::SessionGate;

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared resources: the configuration, the collaborator handles, the cart
/// store, and the session gate.
///
/// The cart sits behind a `Mutex` rather than an async lock on purpose:
/// cart mutations are synchronous and complete within a single dispatch,
/// so the lock is never held across an await point.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    auth: Arc<dyn AuthProvider>,
    documents: Arc<dyn DocumentStore>,
    storage: Arc<dyn KeyValueStore>,
    push: Arc<dyn PushSource>,
    notifier: Arc<dyn LocalNotifier>,
    cart: Mutex<CartStore>,
    gate: SessionGate,
}

impl AppState {
    /// Create a new application state over the given collaborators.
    ///
    /// The session gate starts unresolved; call
    /// [`crate::session::SessionGate::resolve`] once at startup.
    #[must_use]
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn KeyValueStore>,
        push: Arc<dyn PushSource>,
        notifier: Arc<dyn LocalNotifier>,
    ) -> Self {
        let gate = SessionGate::new(Arc::clone(&storage));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                documents,
                storage,
                push,
                notifier,
                cart: Mutex::new(CartStore::new()),
                gate,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the session gate.
    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.inner.gate
    }

    /// Run one synchronous cart mutation or read under the lock.
    ///
    /// One closure per dispatch keeps cart operations strictly ordered.
    pub fn cart<T>(&self, f: impl FnOnce(&mut CartStore) -> T) -> T {
        let mut cart = self
            .inner
            .cart
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut cart)
    }

    /// Build an authentication service over the shared collaborators.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(
            self.inner.auth.as_ref(),
            self.inner.documents.as_ref(),
            self.inner.storage.as_ref(),
        )
    }

    /// Build a menu service over the shared document store.
    #[must_use]
    pub fn menu_service(&self) -> MenuService<'_> {
        MenuService::new(self.inner.documents.as_ref())
    }

    /// Build a notification forwarder on the configured channel.
    #[must_use]
    pub fn notification_forwarder(&self) -> NotificationForwarder<'_> {
        NotificationForwarder::new(
            self.inner.push.as_ref(),
            self.inner.notifier.as_ref(),
            &self.inner.config.notification_channel,
        )
    }

    /// Get a reference to the authentication provider.
    ///
    /// The session gate's run loop subscribes through this handle.
    #[must_use]
    pub fn auth_provider(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }
}
