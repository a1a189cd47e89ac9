//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Whether a menu item is visible to customers.
///
/// Stored documents carry this as a bare boolean (`status: true/false`),
/// so the enum serializes through `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "bool", into = "bool")]
pub enum ItemStatus {
    /// Shown on the menu.
    Active,
    /// Hidden from the menu.
    #[default]
    Inactive,
}

impl ItemStatus {
    /// Returns true if the item is active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// The opposite status. Used by the status toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl From<bool> for ItemStatus {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

impl From<ItemStatus> for bool {
    fn from(status: ItemStatus) -> Self {
        status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(ItemStatus::Active.toggled(), ItemStatus::Inactive);
        assert_eq!(ItemStatus::Inactive.toggled(), ItemStatus::Active);
    }

    #[test]
    fn test_serde_as_bool() {
        assert_eq!(serde_json::to_string(&ItemStatus::Active).unwrap(), "true");
        let status: ItemStatus = serde_json::from_str("false").unwrap();
        assert_eq!(status, ItemStatus::Inactive);
    }
}
