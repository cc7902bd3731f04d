//! Admin-only identity management.

use axum::extract::State;
use folio_core::models::auth::Identity;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AdminUser;
use crate::models::{UpdateRoleRequest, UpdateStatusRequest};
use crate::response::ApiResponse;
use crate::services::users;

/// `GET /api/admin/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<ApiResponse<Vec<Identity>>> {
    let all = users::list(state.store.as_ref()).await?;
    Ok(ApiResponse::ok("Users retrieved successfully", all))
}

/// `PUT /api/admin/users/{id}/role`
pub async fn update_role_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateRoleRequest>,
) -> AppResult<ApiResponse<Identity>> {
    let user = users::set_role(state.store.as_ref(), id, body.role).await?;
    Ok(ApiResponse::ok("User role updated successfully", user))
}

/// `PUT /api/admin/users/{id}/status`
pub async fn update_status_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<Identity>> {
    let user = users::set_active(state.store.as_ref(), id, body.is_active).await?;
    Ok(ApiResponse::ok("User status updated successfully", user))
}

/// `DELETE /api/admin/users/{id}`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    users::delete(state.store.as_ref(), id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
