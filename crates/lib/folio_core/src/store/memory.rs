//! In-process store.
//!
//! One `RwLock` guards both tables, so every check-then-write (email
//! uniqueness, insert-if-absent) happens inside a single critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, ProjectStore, StoreError};
use crate::models::auth::{Credentials, Identity, IdentityPatch, NewIdentity};
use crate::models::project::{NewProject, Project, ProjectPatch, ProjectStatus};
use crate::uuid::uuidv7;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, Credentials>,
    projects: HashMap<Uuid, Project>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users.values().any(|c| {
            Some(c.identity.id) != except && c.identity.email.eq_ignore_ascii_case(email)
        })
    }

    fn insert_identity(&mut self, new: NewIdentity) -> Identity {
        let now = Utc::now();
        let identity = Identity {
            id: uuidv7(),
            name: new.name,
            email: new.email,
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(
            identity.id,
            Credentials {
                identity: identity.clone(),
                password_hash: new.password_hash,
            },
        );
        identity
    }
}

/// Newest first; UUIDv7 ids break timestamp ties in creation order.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid)) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

/// Store that lives in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|c| c.identity.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|c| c.identity.clone()))
    }

    async fn create_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&identity.email, None) {
            return Err(StoreError::DuplicateEmail(identity.email));
        }
        Ok(tables.insert_identity(identity))
    }

    async fn create_identity_if_absent(
        &self,
        identity: NewIdentity,
    ) -> Result<Option<Identity>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&identity.email, None) {
            return Ok(None);
        }
        Ok(Some(tables.insert_identity(identity)))
    }

    async fn update_identity(
        &self,
        id: Uuid,
        patch: IdentityPatch,
    ) -> Result<Option<Identity>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email
            && tables.email_taken(email, Some(id))
        {
            return Err(StoreError::DuplicateEmail(email.clone()));
        }
        let Some(creds) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            creds.identity.name = name;
        }
        if let Some(email) = patch.email {
            creds.identity.email = email;
        }
        if let Some(hash) = patch.password_hash {
            creds.password_hash = hash;
        }
        if let Some(role) = patch.role {
            creds.identity.role = role;
        }
        if let Some(active) = patch.is_active {
            creds.identity.is_active = active;
        }
        creds.identity.updated_at = Utc::now();
        Ok(Some(creds.identity.clone()))
    }

    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            // Mirrors the ON DELETE CASCADE on projects.created_by.
            tables.projects.retain(|_, p| p.created_by != id);
        }
        Ok(removed)
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let tables = self.tables.read().await;
        let mut identities: Vec<Identity> =
            tables.users.values().map(|c| c.identity.clone()).collect();
        newest_first(&mut identities, |i| (i.created_at, i.id));
        Ok(identities)
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_published_projects(&self) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Published)
            .cloned()
            .collect();
        newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn list_projects_by_owner(&self, owner: Uuid) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.created_by == owner)
            .cloned()
            .collect();
        newest_first(&mut projects, |p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.get(&id).cloned())
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: uuidv7(),
            title: project.title,
            description: project.description,
            short_description: project.short_description,
            technologies: project.technologies,
            live_url: project.live_url,
            github_url: project.github_url,
            featured: project.featured,
            status: project.status,
            created_by: project.created_by,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(short) = patch.short_description {
            project.short_description = short;
        }
        if let Some(technologies) = patch.technologies {
            project.technologies = technologies;
        }
        if let Some(url) = patch.live_url {
            project.live_url = url;
        }
        if let Some(url) = patch.github_url {
            project.github_url = url;
        }
        if let Some(featured) = patch.featured {
            project.featured = featured;
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.remove(&id).is_some())
    }

    async fn delete_projects_by_owner(&self, owner: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|_, p| p.created_by != owner);
        Ok((before - tables.projects.len()) as u64)
    }
}
