//! Authentication service: registration, login and the current identity.

use folio_core::auth::AuthError;
use folio_core::auth::jwt::TokenService;
use folio_core::auth::password::PasswordHasher;
use folio_core::models::auth::{Identity, NewIdentity};
use folio_core::store::Store;
use folio_core::validation::{IdentityFields, identity_errors, normalize_email};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, LoginRequest, RegisterRequest, TokenResponse};

fn token_response(identity: &Identity, tokens: &TokenService) -> AppResult<TokenResponse> {
    Ok(TokenResponse {
        user: AuthUser::from(identity),
        token: tokens.issue(identity.id)?,
    })
}

/// Create an account and issue its first token.
pub async fn register(
    store: &dyn Store,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    body: RegisterRequest,
) -> AppResult<TokenResponse> {
    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return Err(AppError::BadRequest(
            "Please provide name, email and password".into(),
        ));
    };
    if [&name, &email, &password].iter().any(|v| v.is_empty()) {
        return Err(AppError::BadRequest(
            "Please provide name, email and password".into(),
        ));
    }

    let errors = identity_errors(IdentityFields {
        name: Some(&name),
        email: Some(&email),
        password: Some(&password),
    });
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let email = normalize_email(&email);
    if store.find_identity_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateIdentity(email));
    }

    let password_hash = hasher.hash(&password).await?;
    // The unique index still guards the race between the check above and here.
    let identity = store
        .create_identity(NewIdentity {
            name: name.trim().to_string(),
            email,
            password_hash,
            role: body.role.unwrap_or_default(),
        })
        .await?;

    info!(user_id = %identity.id, role = %identity.role, "identity registered");
    token_response(&identity, tokens)
}

/// Exchange email and password for a token.
///
/// Unknown email and wrong password produce the same error. The active flag
/// is checked only after the password matches.
pub async fn login(
    store: &dyn Store,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    body: LoginRequest,
) -> AppResult<TokenResponse> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::BadRequest("Please provide email and password".into()));
    };
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Please provide email and password".into()));
    }

    let email = normalize_email(&email);
    let Some(credentials) = store.find_identity_by_email(&email).await? else {
        debug!("login: unknown email");
        hasher.verify_unknown(&password).await?;
        return Err(AuthError::InvalidCredentials.into());
    };

    if !hasher.verify(&password, &credentials.password_hash).await? {
        debug!(user_id = %credentials.identity.id, "login: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !credentials.identity.is_active {
        return Err(AppError::Unauthorized(
            "This account has been deactivated".into(),
        ));
    }

    info!(user_id = %credentials.identity.id, "identity logged in");
    token_response(&credentials.identity, tokens)
}

/// Summary of the authenticated caller.
pub fn me(identity: &Identity) -> AuthUser {
    AuthUser::from(identity)
}
