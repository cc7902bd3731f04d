//! JWT token generation and verification.
//!
//! Tokens are stateless: validity is decided from the HS256 signature and
//! the `exp` claim alone. There is no revocation list, so a leaked token
//! stays usable until it expires unless its identity is deactivated or
//! deleted (the authentication gate re-checks the identity on every call).

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Default token lifetime, in days.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Longest accepted token lifetime, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 10 * 365;

/// Issues and verifies bearer tokens with a single process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected as soon as `now > exp`.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject`, expiring `ttl` from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Mint a token as if it had been issued at `issued_at`.
    pub fn issue_at(&self, subject: Uuid, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenError("token expiry out of range".into()))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    /// Check signature and expiry, returning the subject id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            },
        )?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Default location of the generated signing secret.
pub fn default_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("jwt-secret")
}

/// Read the signing secret stored at `path`, generating and persisting a
/// new one when the file is missing or empty.
///
/// A secret that cannot be written is still returned, but tokens signed
/// with it stop verifying after a restart.
pub fn load_or_create_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "generated JWT secret could not be persisted; tokens will not survive a restart"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::days(DEFAULT_TOKEN_TTL_DAYS)
    }

    fn service() -> TokenService {
        TokenService::new(b"test-secret", ttl())
    }

    #[test]
    fn issued_token_verifies_to_its_subject() {
        let tokens = service();
        let id = Uuid::now_v7();
        let token = tokens.issue(id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn token_past_its_ttl_is_expired() {
        let tokens = service();
        let issued_at = Utc::now() - ttl() - Duration::seconds(10);
        let token = tokens.issue_at(Uuid::now_v7(), issued_at).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn token_just_inside_its_ttl_is_valid() {
        let tokens = service();
        let issued_at = Utc::now() - ttl() + Duration::minutes(5);
        let id = Uuid::now_v7();
        let token = tokens.issue_at(id, issued_at).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let other = TokenService::new(b"another-secret", ttl());
        let token = other.issue(Uuid::now_v7()).unwrap();
        assert!(matches!(service().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_with_foreign_signature_is_invalid_not_expired() {
        let other = TokenService::new(b"another-secret", ttl());
        let issued_at = Utc::now() - Duration::days(60);
        let token = other.issue_at(Uuid::now_v7(), issued_at).unwrap();
        assert!(matches!(service().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service();
        assert!(matches!(tokens.verify(""), Err(AuthError::InvalidToken)));
        assert!(matches!(tokens.verify("not.a.token"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let claims = TokenClaims {
            sub: "admin".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(service().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expiry_is_ttl_after_issue() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(2));
        let issued_at = Utc::now();
        let token = tokens.issue_at(Uuid::now_v7(), issued_at).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let tokens = TokenService::new(b"test-secret", Duration::days(1_000_000 * 365));
        assert!(matches!(
            tokens.issue(Uuid::now_v7()),
            Err(AuthError::TokenError(_))
        ));
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("folio-jwt-{}", Uuid::now_v7()))
            .join(name)
    }

    #[test]
    fn generated_secret_is_persisted_and_reused() {
        let path = scratch_path("jwt-secret");
        let first = load_or_create_secret(&path);
        assert_eq!(first.len(), 64);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(load_or_create_secret(&path), first);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unwritable_location_still_yields_a_secret() {
        // The parent "directory" is a regular file, so nothing can be created under it.
        let blocker = scratch_path("blocker");
        std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("jwt-secret");

        let secret = load_or_create_secret(&path);
        assert_eq!(secret.len(), 64);
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(blocker.parent().unwrap());
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains("test-secret"));
    }
}
