//! Authorization policies.
//!
//! Pure predicates evaluated after authentication succeeded. They never
//! touch the store; the caller supplies the resolved identity and, for the
//! ownership policy, the owner id of the target resource.

use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{Identity, Role};

/// Pass iff the caller's role is one of `permitted`.
pub fn require_role(caller: &Identity, permitted: &[Role]) -> Result<(), AuthError> {
    if permitted.contains(&caller.role) {
        return Ok(());
    }
    Err(AuthError::Forbidden(format!(
        "User role '{}' is not authorized to access this route.",
        caller.role
    )))
}

/// True when the caller owns the resource or is an admin.
pub fn is_owner_or_admin(caller: &Identity, owner_id: Uuid) -> bool {
    caller.id == owner_id || caller.role.is_admin()
}

/// Pass iff the caller owns the resource or is an admin.
pub fn require_owner_or_admin(caller: &Identity, owner_id: Uuid) -> Result<(), AuthError> {
    if is_owner_or_admin(caller, owner_id) {
        return Ok(());
    }
    Err(AuthError::Forbidden(
        "Not authorized to modify this resource".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn identity(role: Role) -> Identity {
        let now = Utc::now();
        Identity {
            id: Uuid::now_v7(),
            name: "A".into(),
            email: "a@x.com".into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn user_is_refused_admin_only_routes() {
        let err = require_role(&identity(Role::User), &[Role::Admin]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User role 'user' is not authorized to access this route."
        );
    }

    #[test]
    fn admin_passes_admin_only_routes() {
        assert!(require_role(&identity(Role::Admin), &[Role::Admin]).is_ok());
    }

    #[test]
    fn any_listed_role_passes() {
        let permitted = [Role::User, Role::Admin];
        assert!(require_role(&identity(Role::User), &permitted).is_ok());
        assert!(require_role(&identity(Role::Admin), &permitted).is_ok());
        assert!(require_role(&identity(Role::Admin), &[]).is_err());
    }

    #[test]
    fn owner_may_modify_own_resource() {
        let caller = identity(Role::User);
        assert!(require_owner_or_admin(&caller, caller.id).is_ok());
    }

    #[test]
    fn non_owner_user_is_forbidden() {
        let caller = identity(Role::User);
        let err = require_owner_or_admin(&caller, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[test]
    fn admin_overrides_ownership() {
        let caller = identity(Role::Admin);
        assert!(require_owner_or_admin(&caller, Uuid::now_v7()).is_ok());
        assert!(is_owner_or_admin(&caller, Uuid::nil()));
    }
}
