//! Identity domain models.
//!
//! `Identity` is the projection handed to request handlers and serialized
//! in responses. It never carries the password hash; only `Credentials`
//! does, and that type is deliberately not `Serialize`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Coarse permission tier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("`{other}` is not a valid role")),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// A registered account, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity with password hash (for internal login flows only).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credentials {
    #[sqlx(flatten)]
    pub identity: Identity,
    pub password_hash: String,
}

/// Fields required to create an identity. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update of an identity. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    /// A freshly derived hash; set only when the password itself changed.
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Bootstrap admin identity settings.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: identity ID (standard JWT `sub` claim).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" User ".parse::<Role>(), Ok(Role::User));
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn identity_serializes_without_password_material() {
        let now = Utc::now();
        let identity = Identity {
            id: Uuid::nil(),
            name: "A".into(),
            email: "a@x.com".into(),
            role: Role::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["isActive"], true);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn admin_seed_debug_hides_password() {
        let seed = AdminSeed {
            name: "Admin".into(),
            email: "admin@x.com".into(),
            password: "hunter22".into(),
        };
        assert!(!format!("{seed:?}").contains("hunter22"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(IdentityPatch::default().is_empty());
        let patch = IdentityPatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
