//! Password hashing via bcrypt.
//!
//! bcrypt salts every hash and compares digests in constant time. The cost
//! factor is process-wide configuration; hashes made with another cost still
//! verify because the cost is encoded in the hash itself.

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 12;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Salt and digest of a fixed bcrypt hash. Prefixed with the configured
/// cost, it stands in for the stored hash of an account that does not exist.
const UNKNOWN_ACCOUNT_SALT_AND_DIGEST: &str = "R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Cost-configured hasher that runs bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Internal(format!(
                "bcrypt cost {cost} outside {MIN_COST}..={MAX_COST}"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` without blocking the async runtime.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let cost = self.cost;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task: {e}")))?
    }

    /// Verify `password` against `hash` without blocking the async runtime.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task: {e}")))?
    }

    /// Run the same bcrypt work as [`verify`](Self::verify) for a login whose
    /// email matches no account, so both failures take equally long.
    /// Always `false`.
    pub async fn verify_unknown(&self, password: &str) -> Result<bool, AuthError> {
        let stand_in = format!("$2b${:02}${UNKNOWN_ACCOUNT_SALT_AND_DIGEST}", self.cost);
        self.verify(password, &stand_in).await?;
        Ok(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}
