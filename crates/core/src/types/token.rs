//! Opaque session token.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An opaque credential identifying an authenticated user.
///
/// Issued by the authentication provider and cached in local persistence
/// across restarts. The value is never interpreted locally. `Debug` is
/// implemented manually to redact the value from logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a provider-issued token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for handing back to the provider or the
    /// persistence cache.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = SessionToken::new("uid-secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("uid-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_round_trip() {
        let token = SessionToken::new("abc");
        assert_eq!(token.as_str(), "abc");
    }
}
