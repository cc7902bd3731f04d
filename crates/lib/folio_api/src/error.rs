//! Application error types.
//!
//! `AppError` is the single place where lower-level failures (auth, store,
//! sqlx, extractor rejections) are translated into HTTP statuses and the
//! error envelope `{success: false, error, statusCode, details?}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::auth::AuthError;
use folio_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Underlying cause of a `500`, carried as a response extension.
///
/// Never serialized by default; [`expose_internal_details`] copies it into
/// the body when the router runs in development mode.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::DuplicateIdentity(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

fn error_response(status: StatusCode, error: String, details: Option<Vec<String>>) -> Response {
    let body = Json(ErrorBody {
        success: false,
        error,
        status_code: status.as_u16(),
        details,
    });
    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m) => error_response(status, m, None),
            AppError::Validation(errors) => {
                error_response(status, "Validation failed".into(), Some(errors))
            }
            AppError::DuplicateIdentity(_) => {
                error_response(status, "User already exists with this email".into(), None)
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                let mut response = error_response(status, "Internal server error".into(), None);
                response.extensions_mut().insert(InternalDetail(detail));
                response
            }
        }
    }
}

/// Response mapper that adds the [`InternalDetail`] of a `500` to its
/// `details` field. Installed by [`crate::router`] in development only.
pub async fn expose_internal_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<InternalDetail>() {
        Some(InternalDetail(detail)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".into(),
            Some(vec![detail]),
        ),
        None => response,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AppError::DuplicateIdentity(email),
            StoreError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::IdentityGone
            | AuthError::Deactivated => AppError::Unauthorized(e.to_string()),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::Validation(errors) => AppError::Validation(errors),
            AuthError::DuplicateIdentity(email) => AppError::DuplicateIdentity(email),
            AuthError::NotFound(_) => AppError::NotFound(e.to_string()),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::Store(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("Resource not found with the specified ID".into())
    }
}
