//! Menu management service.
//!
//! Menu items live entirely in the hosted document store under
//! `users/{uid}/menu`; this service validates drafts, performs the remote
//! writes, and decodes the live snapshot stream. There is no local cache
//! and no conflict resolution: every read is a subscription, every write
//! one remote call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use plateful_core::{DocumentId, ItemStatus, Price, UserId};

use crate::error::{AppError, Result};
use crate::providers::{CollectionPath, Document, DocumentStore, Subscription};

/// A user-owned catalog record as the screens see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Document identifier within the user's menu collection.
    pub key: DocumentId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub status: ItemStatus,
}

/// The stored shape of a menu item (everything but the key, which is the
/// document id). Prices are stored as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MenuRecord {
    title: String,
    #[serde(default)]
    description: String,
    price: Price,
    #[serde(default)]
    status: ItemStatus,
}

/// Input for add and update operations.
#[derive(Debug, Clone)]
pub struct MenuDraft {
    pub title: String,
    pub description: String,
    /// Unparsed price text as typed into the form.
    pub price: String,
    pub status: ItemStatus,
}

impl MenuDraft {
    /// Validate the draft: title and price are required, and the price
    /// must be a non-negative decimal.
    fn validate(&self) -> Result<MenuRecord> {
        if self.title.trim().is_empty() || self.price.trim().is_empty() {
            return Err(AppError::Validation(
                "Title and Price are required".to_owned(),
            ));
        }

        let price: Price = self
            .price
            .parse()
            .map_err(|_| AppError::Validation("Price must be a non-negative number".to_owned()))?;

        Ok(MenuRecord {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price,
            status: self.status,
        })
    }
}

/// Menu management service.
///
/// Borrowing wrapper; construct one per operation from [`crate::state::AppState`].
pub struct MenuService<'a> {
    documents: &'a dyn DocumentStore,
}

impl<'a> MenuService<'a> {
    /// Create a new menu service.
    #[must_use]
    pub const fn new(documents: &'a dyn DocumentStore) -> Self {
        Self { documents }
    }

    /// Subscribe to the user's menu.
    ///
    /// Emits the full decoded snapshot immediately and on every change.
    /// Call [`decode_snapshot`] on each delivery; documents that fail to
    /// decode are skipped with a warning rather than poisoning the stream.
    #[must_use]
    pub fn watch(&self, user: &UserId) -> Subscription<Vec<Document>> {
        self.documents.watch(&CollectionPath::user_menu(user))
    }

    /// Add a new menu item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank title or price, and
    /// `AppError::Collaborator` if the remote write fails.
    pub async fn add(&self, user: &UserId, draft: &MenuDraft) -> Result<DocumentId> {
        let record = draft.validate()?;
        let key = self
            .documents
            .add(&CollectionPath::user_menu(user), to_value(&record)?)
            .await?;
        tracing::info!(%key, title = %record.title, "menu item added");
        Ok(key)
    }

    /// Replace an existing menu item.
    ///
    /// # Errors
    ///
    /// Same conditions as [`MenuService::add`].
    pub async fn update(&self, user: &UserId, key: &DocumentId, draft: &MenuDraft) -> Result<()> {
        let record = draft.validate()?;
        self.documents
            .set(&CollectionPath::user_menu(user), key, to_value(&record)?)
            .await?;
        tracing::info!(%key, "menu item updated");
        Ok(())
    }

    /// Delete a menu item. Confirmation is the screen's concern.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Collaborator` if the remote delete fails.
    pub async fn delete(&self, user: &UserId, key: &DocumentId) -> Result<()> {
        self.documents
            .delete(&CollectionPath::user_menu(user), key)
            .await?;
        tracing::info!(%key, "menu item deleted");
        Ok(())
    }

    /// Flip an item between active and inactive via a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Collaborator` if the remote update fails.
    pub async fn toggle_status(&self, user: &UserId, item: &MenuItem) -> Result<()> {
        let next = item.status.toggled();
        self.documents
            .update(
                &CollectionPath::user_menu(user),
                &item.key,
                serde_json::json!({ "status": bool::from(next) }),
            )
            .await?;
        tracing::info!(key = %item.key, active = next.is_active(), "menu item status toggled");
        Ok(())
    }
}

/// Decode one snapshot delivery into menu items.
///
/// Skips documents that do not decode, logging each at warn; a single
/// malformed record must not take down the whole menu screen.
#[must_use]
pub fn decode_snapshot(documents: Vec<Document>) -> Vec<MenuItem> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<MenuRecord>(doc.data) {
            Ok(record) => Some(MenuItem {
                key: doc.id,
                title: record.title,
                description: record.description,
                price: record.price,
                status: record.status,
            }),
            Err(error) => {
                tracing::warn!(key = %doc.id, %error, "skipping undecodable menu document");
                None
            }
        })
        .collect()
}

fn to_value(record: &MenuRecord) -> Result<Value> {
    serde_json::to_value(record)
        .map_err(|e| AppError::Collaborator(crate::providers::ProviderError::new(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::MemoryDocumentStore;
    use serde_json::json;

    fn draft(title: &str, price: &str) -> MenuDraft {
        MenuDraft {
            title: title.to_owned(),
            description: "House special".to_owned(),
            price: price.to_owned(),
            status: ItemStatus::Inactive,
        }
    }

    #[tokio::test]
    async fn test_add_requires_title_and_price() {
        let store = MemoryDocumentStore::new();
        let service = MenuService::new(&store);
        let user = UserId::new("uid-1");

        let error = service.add(&user, &draft("", "10")).await.unwrap_err();
        assert_eq!(error.user_message(), "Title and Price are required");

        let error = service.add(&user, &draft("Soup", "  ")).await.unwrap_err();
        assert_eq!(error.user_message(), "Title and Price are required");

        let error = service.add(&user, &draft("Soup", "free")).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_then_watch_round_trip() {
        let store = MemoryDocumentStore::new();
        let service = MenuService::new(&store);
        let user = UserId::new("uid-1");

        let key = service.add(&user, &draft("Soup", "4.50")).await.unwrap();

        let mut sub = service.watch(&user);
        let items = decode_snapshot(sub.recv().await.unwrap());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, key);
        assert_eq!(items[0].title, "Soup");
        assert_eq!(items[0].price, "4.50".parse().unwrap());
        assert_eq!(items[0].status, ItemStatus::Inactive);
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = MemoryDocumentStore::new();
        let service = MenuService::new(&store);
        let user = UserId::new("uid-1");

        let key = service.add(&user, &draft("Soup", "4.50")).await.unwrap();
        service
            .update(&user, &key, &draft("Gazpacho", "5.00"))
            .await
            .unwrap();

        let mut sub = service.watch(&user);
        let items = decode_snapshot(sub.recv().await.unwrap());
        assert_eq!(items[0].title, "Gazpacho");
        assert_eq!(items[0].price, "5".parse().unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = MemoryDocumentStore::new();
        let service = MenuService::new(&store);
        let user = UserId::new("uid-1");

        let key = service.add(&user, &draft("Soup", "4.50")).await.unwrap();
        service.delete(&user, &key).await.unwrap();

        let mut sub = service.watch(&user);
        assert!(decode_snapshot(sub.recv().await.unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_toggle_status_flips_only_status() {
        let store = MemoryDocumentStore::new();
        let service = MenuService::new(&store);
        let user = UserId::new("uid-1");

        let key = service.add(&user, &draft("Soup", "4.50")).await.unwrap();
        let mut sub = service.watch(&user);
        let items = decode_snapshot(sub.recv().await.unwrap());

        service.toggle_status(&user, &items[0]).await.unwrap();
        let items = decode_snapshot(sub.recv().await.unwrap());
        assert_eq!(items[0].status, ItemStatus::Active);
        assert_eq!(items[0].title, "Soup");
        assert_eq!(items[0].key, key);
    }

    #[tokio::test]
    async fn test_watch_skips_undecodable_documents() {
        let store = MemoryDocumentStore::new();
        let user = UserId::new("uid-1");
        let menu = CollectionPath::user_menu(&user);

        store
            .add(&menu, json!({ "title": "Soup", "price": "4.50" }))
            .await
            .unwrap();
        store.add(&menu, json!({ "garbage": true })).await.unwrap();

        let service = MenuService::new(&store);
        let mut sub = service.watch(&user);
        let items = decode_snapshot(sub.recv().await.unwrap());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Soup");
    }
}
