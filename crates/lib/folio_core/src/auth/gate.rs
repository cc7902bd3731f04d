//! Authentication gate.
//!
//! Resolves an `Authorization` header to a live, active identity. One store
//! lookup, no writes, no retries.

use tracing::debug;

use super::AuthError;
use super::jwt::TokenService;
use crate::models::auth::Identity;
use crate::store::CredentialStore;

/// Extract the token from a `Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Verify the bearer token in `header` and load its identity.
///
/// The loaded identity never includes the password hash.
pub async fn authenticate<S>(
    tokens: &TokenService,
    store: &S,
    header: Option<&str>,
) -> Result<Identity, AuthError>
where
    S: CredentialStore + ?Sized,
{
    let token = bearer_token(header).inspect_err(|_| debug!("auth: no bearer token"))?;

    let subject = tokens
        .verify(token)
        .inspect_err(|e| debug!(reason = %e, "auth: token rejected"))?;

    let identity = store.find_identity(subject).await?.ok_or_else(|| {
        debug!(%subject, "auth: identity no longer exists");
        AuthError::IdentityGone
    })?;

    if !identity.is_active {
        debug!(%subject, "auth: identity deactivated");
        return Err(AuthError::Deactivated);
    }

    Ok(identity)
}
