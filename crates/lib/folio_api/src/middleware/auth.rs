//! Authentication extractors.
//!
//! Handlers declare what they need in their signature: `CurrentUser` for any
//! live account, `AdminUser` for the admin tier, `MaybeUser` for public
//! routes that show more to owners. The resolved identity is passed to the
//! handler explicitly; nothing is stored in request extensions.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use folio_core::auth::{gate, policy};
use folio_core::models::auth::{Identity, Role};

use crate::AppState;
use crate::error::AppError;

fn authorization(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Identity, AppError> {
    let identity =
        gate::authenticate(&state.tokens, state.store.as_ref(), authorization(parts)).await?;
    Ok(identity)
}

/// An authenticated, active identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(CurrentUser)
    }
}

/// An authenticated identity holding the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = resolve(parts, state).await?;
        policy::require_role(&identity, &[Role::Admin])?;
        Ok(AdminUser(identity))
    }
}

/// The caller's identity when a valid token is presented.
///
/// Any authentication failure degrades to `None`; storage failures still
/// reject the request.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match gate::authenticate(&state.tokens, state.store.as_ref(), authorization(parts)).await {
            Ok(identity) => Ok(MaybeUser(Some(identity))),
            Err(e) if e.is_unauthenticated() => Ok(MaybeUser(None)),
            Err(e) => Err(e.into()),
        }
    }
}
