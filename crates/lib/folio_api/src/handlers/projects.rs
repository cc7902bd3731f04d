//! Project handlers.

use axum::extract::State;
use folio_core::models::project::Project;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::models::{CreateProjectRequest, UpdateProjectRequest};
use crate::response::ApiResponse;
use crate::services::projects;

/// `GET /api/projects`: published projects.
pub async fn list_projects_handler(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    let list = projects::list_published(state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Projects retrieved successfully", list))
}

/// `GET /api/projects/my/projects`
pub async fn my_projects_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<ApiResponse<Vec<Project>>> {
    let list = projects::list_owned(state.store.as_ref(), &user).await?;
    Ok(ApiResponse::ok("Your projects retrieved successfully", list))
}

/// `GET /api/projects/{id}`
pub async fn get_project_handler(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<ApiResponse<Project>> {
    let project = projects::get(state.store.as_ref(), user.as_ref(), id).await?;
    Ok(ApiResponse::ok("Project retrieved successfully", project))
}

/// `POST /api/projects`
pub async fn create_project_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateProjectRequest>,
) -> AppResult<ApiResponse<Project>> {
    let project = projects::create(state.store.as_ref(), &user, body).await?;
    Ok(ApiResponse::created("Project created successfully", project))
}

/// `PUT /api/projects/{id}`
pub async fn update_project_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateProjectRequest>,
) -> AppResult<ApiResponse<Project>> {
    let project = projects::update(state.store.as_ref(), &user, id, body).await?;
    Ok(ApiResponse::ok("Project updated successfully", project))
}

/// `DELETE /api/projects/{id}`
pub async fn delete_project_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    projects::delete(state.store.as_ref(), &user, id).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}
