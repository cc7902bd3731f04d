//! Portfolio project models.
//!
//! Projects are the owned resource behind the ownership-or-admin policy:
//! `created_by` names the identity allowed to modify them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication state of a project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Published,
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub status: ProjectStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub status: ProjectStatus,
    pub created_by: Uuid,
}

/// Partial update of a project. Ownership cannot be transferred.
///
/// `None` leaves a field unchanged. For the URLs, `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub live_url: Option<Option<String>>,
    pub github_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
}
