//! Authentication and authorization logic.
//!
//! Provides password hashing, bearer-token issuing and verification, the
//! request authentication gate, role and ownership policies, and the
//! bootstrap admin provisioner. Shared by every `folio_api` route.

pub mod gate;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod provision;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
///
/// The `Display` text of the client-facing variants is the message sent in
/// the response envelope.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password share this variant on purpose.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized to access this route. No token provided.")]
    MissingToken,

    #[error("Invalid token. Please login again.")]
    InvalidToken,

    #[error("Token expired. Please login again.")]
    ExpiredToken,

    #[error("The user belonging to this token no longer exists.")]
    IdentityGone,

    #[error("This user account has been deactivated.")]
    Deactivated,

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("User already exists with this email")]
    DuplicateIdentity(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for every rejection that maps to `401 Unauthorized`.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::MissingToken
                | Self::InvalidToken
                | Self::ExpiredToken
                | Self::IdentityGone
                | Self::Deactivated
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AuthError::DuplicateIdentity(email),
            other => AuthError::Store(other),
        }
    }
}
