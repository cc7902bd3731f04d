//! Authentication request handlers.

use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::CurrentUser;
use crate::models::{AuthUser, LoginRequest, RegisterRequest, TokenResponse};
use crate::response::ApiResponse;
use crate::services::auth;

/// `POST /api/auth/register`: create an account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let resp = auth::register(state.store.as_ref(), &state.hasher, &state.tokens, body).await?;
    Ok(ApiResponse::created("User registered successfully", resp))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let resp = auth::login(state.store.as_ref(), &state.hasher, &state.tokens, body).await?;
    Ok(ApiResponse::ok("User logged in successfully", resp))
}

/// `POST /api/auth/logout`: tokens are stateless; the client discards its own.
pub async fn logout_handler() -> ApiResponse<()> {
    ApiResponse::message("User logged out successfully")
}

/// `GET /api/auth/me`
pub async fn me_handler(CurrentUser(user): CurrentUser) -> ApiResponse<AuthUser> {
    ApiResponse::ok("User profile retrieved successfully", auth::me(&user))
}
