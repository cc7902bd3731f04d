//! Persistence contracts.
//!
//! Handlers depend on `Arc<dyn Store>`. `PgStore` is the production
//! backend; `MemoryStore` keeps everything in process memory and enforces
//! the same uniqueness rules, which makes it suitable for tests.
//!
//! Every method is a single atomic operation on one record (or one owner's
//! records), so callers never need application-level locking.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{Credentials, Identity, IdentityPatch, NewIdentity};
use crate::models::project::{NewProject, Project, ProjectPatch};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email `{0}` is already registered")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Identity persistence.
///
/// Emails are compared case-insensitively; callers pass them normalized.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Identity plus password hash, for login.
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    /// Identity without its password hash.
    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError>;

    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// Atomic upsert-if-absent: `None` when the email is already taken.
    async fn create_identity_if_absent(
        &self,
        identity: NewIdentity,
    ) -> Result<Option<Identity>, StoreError>;

    /// `None` when no identity has this id.
    async fn update_identity(
        &self,
        id: Uuid,
        patch: IdentityPatch,
    ) -> Result<Option<Identity>, StoreError>;

    /// `false` when no identity has this id.
    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All identities, newest first.
    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError>;
}

/// Project persistence.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Published projects, newest first.
    async fn list_published_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Projects created by `owner`, newest first.
    async fn list_projects_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, StoreError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError>;

    async fn update_project(
        &self,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError>;

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns the number of projects removed.
    async fn delete_projects_by_owner(&self, owner: Uuid) -> Result<u64, StoreError>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: CredentialStore + ProjectStore {}

impl<T: CredentialStore + ProjectStore> Store for T {}
