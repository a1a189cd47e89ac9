//! Authentication service.
//!
//! Wraps the hosted authentication provider with local validation, the
//! user-profile document write on sign-up, and best-effort caching of the
//! session token and user-data blob. The session gate reacts to the
//! provider's live stream; this service only initiates the transitions.

use serde_json::json;

use plateful_core::{Email, UserId};

use crate::error::{AppError, AuthError, Result};
use crate::providers::{AuthProvider, AuthSession, CollectionPath, DocumentStore, KeyValueStore};
use crate::session::storage_keys;

/// Authentication service.
///
/// Borrowing wrapper; construct one per operation from [`crate::state::AppState`].
pub struct AuthService<'a> {
    provider: &'a dyn AuthProvider,
    documents: &'a dyn DocumentStore,
    storage: &'a dyn KeyValueStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        provider: &'a dyn AuthProvider,
        documents: &'a dyn DocumentStore,
        storage: &'a dyn KeyValueStore,
    ) -> Self {
        Self {
            provider,
            documents,
            storage,
        }
    }

    /// Sign in with email and password.
    ///
    /// On success the token and the user's profile blob are cached in
    /// local persistence. Both writes are best-effort: a cache failure is
    /// logged and the sign-in still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if either field is blank, and
    /// `AppError::Auth(AuthError::InvalidCredentials)` (with a switch-to-
    /// sign-up recovery) when the provider rejects the credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter both email and password".to_owned(),
            ));
        }

        let email = Email::parse(email).map_err(AuthError::from)?;
        let session = self.provider.sign_in(&email, password).await?;
        tracing::info!(user_id = %session.user_id, "signed in");

        self.cache_session(&session).await;
        Ok(session)
    }

    /// Register a new account.
    ///
    /// Writes the `{name, email}` profile document at `users/{uid}` once
    /// the provider has created the account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if any field is blank or the
    /// passwords do not match, `AppError::Auth` for the provider's
    /// email-in-use and invalid-email rejections, and
    /// `AppError::Collaborator` if the profile write fails.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthSession> {
        if password != confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_owned()));
        }

        if name.trim().is_empty() || email.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::Validation(
                "Please fill in all fields".to_owned(),
            ));
        }

        let email = Email::parse(email).map_err(AuthError::from)?;
        let session = self.provider.sign_up(&email, password).await?;
        tracing::info!(user_id = %session.user_id, "account created");

        let profile = json!({
            "name": name.trim(),
            "email": email.as_str(),
        });
        self.documents
            .set(
                &CollectionPath::users(),
                &profile_document_id(&session.user_id),
                profile,
            )
            .await?;

        Ok(session)
    }

    /// Sign out of the current session.
    ///
    /// Clears local persistence wholesale, dropping the cached token and
    /// the `user_data` blob of the departing user; the gate's
    /// `Unauthenticated` transition follows from the provider's `Cleared`
    /// event. The cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Collaborator` if the provider call fails.
    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await?;
        tracing::info!("signed out");

        if let Err(error) = self.storage.clear().await {
            tracing::warn!(%error, "storage clear failed after sign-out");
        }
        Ok(())
    }

    /// Cache the token and the fetched profile blob, best-effort.
    async fn cache_session(&self, session: &AuthSession) {
        if let Err(error) = self
            .storage
            .set(storage_keys::SESSION_TOKEN, session.token.as_str())
            .await
        {
            tracing::warn!(%error, "token cache failed");
        }

        // Drop any stale blob before fetching the fresh one.
        if let Err(error) = self.storage.remove(storage_keys::USER_DATA).await {
            tracing::warn!(%error, "stale user data removal failed");
        }

        match self
            .documents
            .get(
                &CollectionPath::users(),
                &profile_document_id(&session.user_id),
            )
            .await
        {
            Ok(Some(profile)) => {
                let blob = profile.data.to_string();
                if let Err(error) = self.storage.set(storage_keys::USER_DATA, &blob).await {
                    tracing::warn!(%error, "user data cache failed");
                }
            }
            Ok(None) => tracing::debug!("no profile document to cache"),
            Err(error) => tracing::warn!(%error, "profile fetch failed"),
        }
    }
}

/// Profile documents are keyed by the user's id.
fn profile_document_id(user_id: &UserId) -> plateful_core::DocumentId {
    plateful_core::DocumentId::new(user_id.as_str())
}
