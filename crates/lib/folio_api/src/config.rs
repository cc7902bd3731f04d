//! API server configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use folio_core::auth::jwt::{
    DEFAULT_TOKEN_TTL_DAYS, MAX_TOKEN_TTL_DAYS, default_secret_path, load_or_create_secret,
};
use folio_core::auth::password::{DEFAULT_COST, MAX_COST, MIN_COST};
use folio_core::models::auth::AdminSeed;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:4200,http://localhost:3000,http://localhost:5000";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Deployment mode. Development adds error details to `500` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl: Duration,
    /// bcrypt cost factor.
    pub bcrypt_cost: u32,
    /// Bootstrap admin identity.
    pub admin: AdminSeed,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub environment: Environment,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                                     |
    /// |--------------------|---------------------------------------------|
    /// | `BIND_ADDR`        | `127.0.0.1:5000`                            |
    /// | `DATABASE_URL`     | `postgres://localhost:5432/folio`           |
    /// | `JWT_SECRET` / `AUTH_SECRET` | read from `JWT_SECRET_FILE`       |
    /// | `JWT_SECRET_FILE`  | `<data dir>/folio/jwt-secret`, generated    |
    /// | `JWT_EXPIRE`       | `30d`                                       |
    /// | `BCRYPT_COST`      | `12`                                        |
    /// | `ADMIN_EMAIL`      | `admin@quantumdev.com`                      |
    /// | `ADMIN_PASSWORD`   | `admin123`                                  |
    /// | `ADMIN_NAME`       | `Quantum Admin`                             |
    /// | `CORS_ORIGINS`     | local dev origins                           |
    /// | `APP_ENV`          | `production`                                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET")
            .or_else(|| var("AUTH_SECRET"))
            .unwrap_or_else(|| {
                let path = var("JWT_SECRET_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_secret_path);
                load_or_create_secret(&path)
            });

        let token_ttl = match var("JWT_EXPIRE") {
            Some(raw) => parse_ttl(&raw)?,
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_DAYS as u64 * 24 * 60 * 60),
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(raw) => parse_cost(&raw)?,
            None => DEFAULT_COST,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:5000".into()),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/folio".into()),
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            admin: AdminSeed {
                name: var("ADMIN_NAME").unwrap_or_else(|| "Quantum Admin".into()),
                email: var("ADMIN_EMAIL").unwrap_or_else(|| "admin@quantumdev.com".into()),
                password: var("ADMIN_PASSWORD").unwrap_or_else(|| "admin123".into()),
            },
            cors_origins: split_origins(
                &var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into()),
            ),
            environment: var("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or_default(),
        })
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin", &self.admin)
            .field("cors_origins", &self.cors_origins)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Parse a humantime duration such as `30d`, `12h` or `90m`.
fn parse_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let ttl = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: "JWT_EXPIRE",
        message: e.to_string(),
    })?;
    if ttl.is_zero() {
        return Err(ConfigError::Invalid {
            var: "JWT_EXPIRE",
            message: "must be greater than zero".into(),
        });
    }
    if ttl.as_secs() > MAX_TOKEN_TTL_DAYS as u64 * 24 * 60 * 60 {
        return Err(ConfigError::Invalid {
            var: "JWT_EXPIRE",
            message: format!("must be at most {MAX_TOKEN_TTL_DAYS} days"),
        });
    }
    Ok(ttl)
}

fn parse_cost(raw: &str) -> Result<u32, ConfigError> {
    let cost = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
        var: "BCRYPT_COST",
        message: e.to_string(),
    })?;
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(ConfigError::Invalid {
            var: "BCRYPT_COST",
            message: format!("must be within {MIN_COST}..={MAX_COST}"),
        });
    }
    Ok(cost)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
