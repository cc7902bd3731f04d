//! Request and response bodies.

use folio_core::models::auth::{Identity, Role};
use folio_core::models::project::ProjectStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Identity summary returned by register, login and `/me`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Identity> for AuthUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role,
        }
    }
}

/// [`AuthUser`] plus a freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub user: AuthUser,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Self-service profile update. Role is not accepted here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
    pub environment: &'static str,
}
