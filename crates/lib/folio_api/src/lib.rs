//! # folio_api
//!
//! HTTP API library for Folio.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, Uri};
use axum::routing::{get, post, put};
use folio_core::auth::AuthError;
use folio_core::auth::jwt::TokenService;
use folio_core::auth::password::PasswordHasher;
use folio_core::store::Store;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::handlers::{admin, auth, health, projects, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity and project persistence.
    pub store: Arc<dyn Store>,
    /// API configuration.
    pub config: ApiConfig,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Build the token service and password hasher from `config`.
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Result<Self, AuthError> {
        let ttl = chrono::Duration::from_std(config.token_ttl)
            .map_err(|e| AuthError::Internal(format!("token ttl out of range: {e}")))?;
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), ttl);
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        Ok(Self {
            store,
            config,
            tokens,
            hasher,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `folio_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    folio_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {method} {uri} not found"))
}

/// Builds the Axum router with all routes and shared state.
///
/// Access is declared per handler through its extractors: `CurrentUser`,
/// `AdminUser` or `MaybeUser`. Routes without one are public.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let auth_routes = Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/me", get(auth::me_handler));

    let user_routes = Router::new().route(
        "/profile",
        get(users::get_profile_handler)
            .put(users::update_profile_handler)
            .delete(users::delete_profile_handler),
    );

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users_handler))
        .route("/users/{id}", axum::routing::delete(admin::delete_user_handler))
        .route("/users/{id}/role", put(admin::update_role_handler))
        .route("/users/{id}/status", put(admin::update_status_handler));

    let project_routes = Router::new()
        .route(
            "/",
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route("/my/projects", get(projects::my_projects_handler))
        .route(
            "/{id}",
            get(projects::get_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        );

    let mut app = Router::new()
        .route("/api/health", get(health::health_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/projects", project_routes)
        .fallback(route_not_found);
    if state.config.environment.is_development() {
        app = app.layer(axum::middleware::map_response(error::expose_internal_details));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
