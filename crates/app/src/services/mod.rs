//! Service layer over the collaborator traits.
//!
//! Each service is a thin, borrowing wrapper the screens call into:
//! validation happens here, then exactly one remote round trip per
//! operation. No service retries, caches, or resolves conflicts.

pub mod auth;
pub mod menu;
pub mod notifications;

pub use auth::AuthService;
pub use menu::{MenuDraft, MenuItem, MenuService};
pub use notifications::NotificationForwarder;
