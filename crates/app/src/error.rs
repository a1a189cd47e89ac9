//! Unified error handling.
//!
//! The taxonomy is shallow by design: a failed operation is terminal for
//! that operation only, nothing is retried automatically, and nothing is
//! fatal to the process. Screens call [`AppError::user_message`] for the
//! text to surface and [`AppError::recovery`] for an optional recovery
//! action to offer.

use thiserror::Error;

use plateful_core::EmailError;

use crate::providers::{ProviderError, SignInError, SignUpError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or inconsistent. Blocked locally before
    /// any collaborator call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failed in a way the user can act on.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Any other collaborator failure, surfaced verbatim.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] ProviderError),
}

/// Authentication failures with a specific user-facing story.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email address is already registered.
    #[error("email already in use")]
    EmailInUse,

    /// The email address is malformed, whether caught locally by
    /// [`plateful_core::Email::parse`] or rejected by the provider.
    #[error("invalid email address")]
    InvalidEmail,
}

impl From<EmailError> for AuthError {
    fn from(_: EmailError) -> Self {
        Self::InvalidEmail
    }
}

/// A recovery action a screen can offer alongside an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Offer to switch to the sign-up screen.
    SwitchToSignUp,
}

impl AppError {
    /// The message to surface to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Auth(AuthError::InvalidCredentials) => {
                "Invalid email or password. You can create an account instead.".to_owned()
            }
            Self::Auth(AuthError::EmailInUse) => {
                "That email address is already in use!".to_owned()
            }
            Self::Auth(AuthError::InvalidEmail) => {
                "That email address is invalid!".to_owned()
            }
            Self::Collaborator(error) => error.to_string(),
        }
    }

    /// The recovery action to offer, if any.
    #[must_use]
    pub const fn recovery(&self) -> Option<Recovery> {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => Some(Recovery::SwitchToSignUp),
            _ => None,
        }
    }
}

impl From<SignInError> for AppError {
    fn from(error: SignInError) -> Self {
        match error {
            SignInError::InvalidCredentials => Self::Auth(AuthError::InvalidCredentials),
            SignInError::Provider(provider) => Self::Collaborator(provider),
        }
    }
}

impl From<SignUpError> for AppError {
    fn from(error: SignUpError) -> Self {
        match error {
            SignUpError::EmailInUse => Self::Auth(AuthError::EmailInUse),
            SignUpError::InvalidEmail => Self::Auth(AuthError::InvalidEmail),
            SignUpError::Provider(provider) => Self::Collaborator(provider),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
