//! Project service. Projects are the resource guarded by the
//! ownership-or-admin policy.

use folio_core::auth::policy;
use folio_core::models::auth::Identity;
use folio_core::models::project::{NewProject, Project, ProjectPatch, ProjectStatus};
use folio_core::store::Store;
use folio_core::validation::{ProjectFields, project_errors};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateProjectRequest, UpdateProjectRequest};

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".into())
}

pub async fn list_published(store: &dyn Store) -> AppResult<Vec<Project>> {
    Ok(store.list_published_projects().await?)
}

pub async fn list_owned(store: &dyn Store, caller: &Identity) -> AppResult<Vec<Project>> {
    Ok(store.list_projects_by_owner(caller.id).await?)
}

/// A single project. Drafts are visible only to their owner and admins;
/// everyone else gets `404`.
pub async fn get(store: &dyn Store, caller: Option<&Identity>, id: Uuid) -> AppResult<Project> {
    let project = store.find_project(id).await?.ok_or_else(project_not_found)?;
    let visible = project.status == ProjectStatus::Published
        || caller.is_some_and(|c| policy::is_owner_or_admin(c, project.created_by));
    if !visible {
        return Err(project_not_found());
    }
    Ok(project)
}

pub async fn create(
    store: &dyn Store,
    caller: &Identity,
    body: CreateProjectRequest,
) -> AppResult<Project> {
    // Required on create: absent text fields validate as empty.
    let errors = project_errors(ProjectFields {
        title: Some(body.title.as_deref().unwrap_or_default()),
        description: Some(body.description.as_deref().unwrap_or_default()),
        short_description: Some(body.short_description.as_deref().unwrap_or_default()),
        live_url: body.live_url.as_deref(),
        github_url: body.github_url.as_deref(),
    });
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let project = store
        .create_project(NewProject {
            title: trimmed(body.title),
            description: trimmed(body.description),
            short_description: trimmed(body.short_description),
            technologies: clean_technologies(body.technologies),
            live_url: body.live_url.and_then(non_empty),
            github_url: body.github_url.and_then(non_empty),
            featured: body.featured,
            status: body.status,
            created_by: caller.id,
        })
        .await?;
    info!(project_id = %project.id, owner = %caller.id, "project created");
    Ok(project)
}

/// Update a project. `404` when absent, `403` unless owner or admin.
pub async fn update(
    store: &dyn Store,
    caller: &Identity,
    id: Uuid,
    body: UpdateProjectRequest,
) -> AppResult<Project> {
    let existing = store.find_project(id).await?.ok_or_else(project_not_found)?;
    policy::require_owner_or_admin(caller, existing.created_by)?;

    let errors = project_errors(ProjectFields {
        title: body.title.as_deref(),
        description: body.description.as_deref(),
        short_description: body.short_description.as_deref(),
        live_url: body.live_url.as_deref(),
        github_url: body.github_url.as_deref(),
    });
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let patch = ProjectPatch {
        title: body.title.map(|t| t.trim().to_string()),
        description: body.description.map(|d| d.trim().to_string()),
        short_description: body.short_description.map(|s| s.trim().to_string()),
        technologies: body.technologies.map(clean_technologies),
        live_url: body.live_url.map(non_empty),
        github_url: body.github_url.map(non_empty),
        featured: body.featured,
        status: body.status,
    };
    // Deleted between the lookup and the update.
    let updated = store
        .update_project(id, patch)
        .await?
        .ok_or_else(project_not_found)?;
    info!(project_id = %id, by = %caller.id, "project updated");
    Ok(updated)
}

/// Delete a project. `404` when absent, `403` unless owner or admin.
pub async fn delete(store: &dyn Store, caller: &Identity, id: Uuid) -> AppResult<()> {
    let existing = store.find_project(id).await?.ok_or_else(project_not_found)?;
    policy::require_owner_or_admin(caller, existing.created_by)?;

    if !store.delete_project(id).await? {
        return Err(project_not_found());
    }
    info!(project_id = %id, by = %caller.id, "project deleted");
    Ok(())
}

/// An empty URL means "no URL".
fn non_empty(url: String) -> Option<String> {
    (!url.is_empty()).then_some(url)
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn clean_technologies(technologies: Vec<String>) -> Vec<String> {
    technologies
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
