//! PostgreSQL-backed store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, ProjectStore, StoreError};
use crate::models::auth::{Credentials, Identity, IdentityPatch, NewIdentity};
use crate::models::project::{NewProject, Project, ProjectPatch};
use crate::uuid::uuidv7;

/// Store over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-constraint violation on `users` to `DuplicateEmail`.
fn email_conflict(e: sqlx::Error, email: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::DbError(e),
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let row = sqlx::query_as::<_, Credentials>(
            "SELECT id, name, email, role, is_active, created_at, updated_at, password_hash \
             FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, Identity>(
            "SELECT id, name, email, role, is_active, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        sqlx::query_as::<_, Identity>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, role, is_active, created_at, updated_at",
        )
        .bind(uuidv7())
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &identity.email))
    }

    async fn create_identity_if_absent(
        &self,
        identity: NewIdentity,
    ) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, Identity>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT DO NOTHING \
             RETURNING id, name, email, role, is_active, created_at, updated_at",
        )
        .bind(uuidv7())
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_identity(
        &self,
        id: Uuid,
        patch: IdentityPatch,
    ) -> Result<Option<Identity>, StoreError> {
        let email = patch.email.clone().unwrap_or_default();
        sqlx::query_as::<_, Identity>(
            "UPDATE users SET \
               name = COALESCE($2, name), \
               email = COALESCE($3, email), \
               password_hash = COALESCE($4, password_hash), \
               role = COALESCE($5, role), \
               is_active = COALESCE($6, is_active), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, email, role, is_active, created_at, updated_at",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.role)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &email))
    }

    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let rows = sqlx::query_as::<_, Identity>(
            "SELECT id, name, email, role, is_active, created_at, updated_at \
             FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_published_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, short_description, technologies, live_url, \
             github_url, featured, status, created_by, created_at, updated_at \
             FROM projects WHERE status = 'published' \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_projects_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, short_description, technologies, live_url, \
             github_url, featured, status, created_by, created_at, updated_at \
             FROM projects WHERE created_by = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, short_description, technologies, live_url, \
             github_url, featured, status, created_by, created_at, updated_at \
             FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, title, description, short_description, technologies, \
             live_url, github_url, featured, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, title, description, short_description, technologies, live_url, \
             github_url, featured, status, created_by, created_at, updated_at",
        )
        .bind(uuidv7())
        .bind(project.title)
        .bind(project.description)
        .bind(project.short_description)
        .bind(project.technologies)
        .bind(project.live_url)
        .bind(project.github_url)
        .bind(project.featured)
        .bind(project.status)
        .bind(project.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, Project>(
            "UPDATE projects SET \
               title = COALESCE($2, title), \
               description = COALESCE($3, description), \
               short_description = COALESCE($4, short_description), \
               technologies = COALESCE($5, technologies), \
               live_url = CASE WHEN $6 THEN $7 ELSE live_url END, \
               github_url = CASE WHEN $8 THEN $9 ELSE github_url END, \
               featured = COALESCE($10, featured), \
               status = COALESCE($11, status), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING id, title, description, short_description, technologies, live_url, \
             github_url, featured, status, created_by, created_at, updated_at",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.short_description)
        .bind(patch.technologies)
        .bind(patch.live_url.is_some())
        .bind(patch.live_url.flatten())
        .bind(patch.github_url.is_some())
        .bind(patch.github_url.flatten())
        .bind(patch.featured)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_projects_by_owner(&self, owner: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE created_by = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
