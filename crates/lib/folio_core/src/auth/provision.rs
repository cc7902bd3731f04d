//! Bootstrap admin provisioning.
//!
//! Guarantees that an admin identity with the configured email exists.
//! Safe to run on every start and from several processes at once: the
//! final write is the store's atomic insert-if-absent.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::AuthError;
use super::password::PasswordHasher;
use crate::models::auth::{AdminSeed, Identity, NewIdentity, Role};
use crate::store::CredentialStore;
use crate::validation::{IdentityFields, identity_errors, normalize_email};

/// Result of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// An identity with the admin email was already present; nothing changed.
    AlreadyPresent,
    /// A new admin identity was created.
    Created(Identity),
}

/// Ensure an admin identity with `seed.email` exists.
///
/// An existing identity with that email is left untouched, whatever its role.
pub async fn ensure_admin<S>(
    store: &S,
    hasher: &PasswordHasher,
    seed: &AdminSeed,
) -> Result<ProvisionOutcome, AuthError>
where
    S: CredentialStore + ?Sized,
{
    let email = normalize_email(&seed.email);
    let errors = identity_errors(IdentityFields {
        name: Some(&seed.name),
        email: Some(&email),
        password: Some(&seed.password),
    });
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    if store.find_identity_by_email(&email).await?.is_some() {
        info!(email = %email, "admin identity already exists");
        return Ok(ProvisionOutcome::AlreadyPresent);
    }

    let password_hash = hasher.hash(&seed.password).await?;
    let created = store
        .create_identity_if_absent(NewIdentity {
            name: seed.name.trim().to_string(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    match created {
        Some(identity) => {
            info!(email = %email, "admin identity created");
            warn!(email = %email, "bootstrap admin uses the configured password; change it after first login");
            Ok(ProvisionOutcome::Created(identity))
        }
        None => {
            info!(email = %email, "admin identity created concurrently");
            Ok(ProvisionOutcome::AlreadyPresent)
        }
    }
}

/// Run [`ensure_admin`] in the background. Failures are logged, never fatal.
pub fn spawn_ensure_admin<S>(
    store: Arc<S>,
    hasher: PasswordHasher,
    seed: AdminSeed,
) -> JoinHandle<()>
where
    S: CredentialStore + ?Sized + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = ensure_admin(store.as_ref(), &hasher, &seed).await {
            error!(error = %e, "admin provisioning failed; admin-only routes stay unreachable");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{MIN_COST, verify_password};
    use crate::store::memory::MemoryStore;

    fn seed() -> AdminSeed {
        AdminSeed {
            name: "Quantum Admin".into(),
            email: "Admin@QuantumDev.com".into(),
            password: "admin123".into(),
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).unwrap()
    }

    #[tokio::test]
    async fn creates_admin_when_absent() {
        let store = MemoryStore::new();
        let outcome = ensure_admin(&store, &hasher(), &seed()).await.unwrap();
        let ProvisionOutcome::Created(identity) = outcome else {
            panic!("expected a created admin, got {outcome:?}");
        };
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.email, "admin@quantumdev.com");
        assert!(identity.is_active);

        let creds = store
            .find_identity_by_email("admin@quantumdev.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("admin123", &creds.password_hash).unwrap());
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let store = MemoryStore::new();
        ensure_admin(&store, &hasher(), &seed()).await.unwrap();
        let outcome = ensure_admin(&store, &hasher(), &seed()).await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadyPresent);
        assert_eq!(store.list_identities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_create_exactly_one_admin() {
        let store = Arc::new(MemoryStore::new());
        let runs = (0..8)
            .map(|_| spawn_ensure_admin(store.clone(), hasher(), seed()))
            .collect::<Vec<_>>();
        for run in runs {
            run.await.unwrap();
        }
        let identities = store.list_identities().await.unwrap();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn existing_identity_with_admin_email_is_left_alone() {
        let store = MemoryStore::new();
        let existing = store
            .create_identity(NewIdentity {
                name: "Squatter".into(),
                email: "admin@quantumdev.com".into(),
                password_hash: "$2b$04$placeholder".into(),
                role: Role::User,
            })
            .await
            .unwrap();
        let outcome = ensure_admin(&store, &hasher(), &seed()).await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadyPresent);
        let after = store.find_identity(existing.id).await.unwrap().unwrap();
        assert_eq!(after, existing);
    }

    #[tokio::test]
    async fn invalid_seed_is_reported() {
        let store = MemoryStore::new();
        let bad = AdminSeed {
            password: "123".into(),
            ..seed()
        };
        let err = ensure_admin(&store, &hasher(), &bad).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(store.list_identities().await.unwrap().is_empty());
    }
}
