//! Profile self-service and admin identity management.

use folio_core::auth::password::PasswordHasher;
use folio_core::models::auth::{Identity, IdentityPatch, Role};
use folio_core::store::Store;
use folio_core::validation::{IdentityFields, identity_errors, normalize_email};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::UpdateProfileRequest;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Re-read the caller's identity.
pub async fn profile(store: &dyn Store, caller: &Identity) -> AppResult<Identity> {
    store
        .find_identity(caller.id)
        .await?
        .ok_or_else(user_not_found)
}

/// Update name, email and password. An empty or absent password keeps the
/// current hash.
pub async fn update_profile(
    store: &dyn Store,
    hasher: &PasswordHasher,
    caller: &Identity,
    body: UpdateProfileRequest,
) -> AppResult<Identity> {
    let password = body.password.filter(|p| !p.is_empty());

    let errors = identity_errors(IdentityFields {
        name: body.name.as_deref(),
        email: body.email.as_deref(),
        password: password.as_deref(),
    });
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = match password {
        Some(p) => Some(hasher.hash(&p).await?),
        None => None,
    };

    let patch = IdentityPatch {
        name: body.name.map(|n| n.trim().to_string()),
        email: body.email.as_deref().map(normalize_email),
        password_hash,
        ..IdentityPatch::default()
    };
    if patch.is_empty() {
        return profile(store, caller).await;
    }

    let updated = store
        .update_identity(caller.id, patch)
        .await?
        .ok_or_else(user_not_found)?;
    info!(user_id = %updated.id, "profile updated");
    Ok(updated)
}

/// Delete the caller's projects, then the caller.
pub async fn delete_account(store: &dyn Store, caller: &Identity) -> AppResult<()> {
    delete_with_projects(store, caller.id).await
}

async fn delete_with_projects(store: &dyn Store, id: Uuid) -> AppResult<()> {
    let projects = store.delete_projects_by_owner(id).await?;
    if !store.delete_identity(id).await? {
        return Err(user_not_found());
    }
    info!(user_id = %id, projects, "identity deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// All identities, newest first.
pub async fn list(store: &dyn Store) -> AppResult<Vec<Identity>> {
    Ok(store.list_identities().await?)
}

pub async fn set_role(store: &dyn Store, id: Uuid, role: Role) -> AppResult<Identity> {
    let patch = IdentityPatch {
        role: Some(role),
        ..IdentityPatch::default()
    };
    let updated = store
        .update_identity(id, patch)
        .await?
        .ok_or_else(user_not_found)?;
    info!(user_id = %id, role = %role, "role changed");
    Ok(updated)
}

/// Activate or deactivate an account. Deactivation takes effect on the
/// account's next request; issued tokens are not revoked.
pub async fn set_active(store: &dyn Store, id: Uuid, is_active: bool) -> AppResult<Identity> {
    let patch = IdentityPatch {
        is_active: Some(is_active),
        ..IdentityPatch::default()
    };
    let updated = store
        .update_identity(id, patch)
        .await?
        .ok_or_else(user_not_found)?;
    info!(user_id = %id, is_active, "active flag changed");
    Ok(updated)
}

/// Delete any identity together with its projects.
pub async fn delete(store: &dyn Store, id: Uuid) -> AppResult<()> {
    if store.find_identity(id).await?.is_none() {
        return Err(user_not_found());
    }
    delete_with_projects(store, id).await
}
