//! Profile handlers for the authenticated caller.

use axum::extract::State;
use folio_core::models::auth::Identity;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::CurrentUser;
use crate::models::UpdateProfileRequest;
use crate::response::ApiResponse;
use crate::services::users;

/// `GET /api/users/profile`
pub async fn get_profile_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<ApiResponse<Identity>> {
    let profile = users::profile(state.store.as_ref(), &user).await?;
    Ok(ApiResponse::ok("Profile retrieved successfully", profile))
}

/// `PUT /api/users/profile`
pub async fn update_profile_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<Identity>> {
    let profile = users::update_profile(state.store.as_ref(), &state.hasher, &user, body).await?;
    Ok(ApiResponse::ok("Profile updated successfully", profile))
}

/// `DELETE /api/users/profile`: removes the caller's projects, then the caller.
pub async fn delete_profile_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<ApiResponse<()>> {
    users::delete_account(state.store.as_ref(), &user).await?;
    Ok(ApiResponse::message(
        "Your account has been deleted successfully",
    ))
}
