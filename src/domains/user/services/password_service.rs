use bcrypt::{hash, verify};
use tokio::task;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 10 }
    }
}

/// bcrypt hashing, run on the blocking pool so it never stalls the runtime.
#[derive(Debug, Clone)]
pub struct PasswordService {
    config: PasswordConfig,
    // Compared against when the account does not exist, so an unknown email
    // costs the same as a wrong password.
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let dummy_hash = hash("not-a-real-password", config.bcrypt_cost)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(Self { config, dummy_hash })
    }

    // Hash a password using bcrypt
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.config.bcrypt_cost;

        task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against its hash. Any failure, including a malformed
    /// hash, is reported as a mismatch.
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        task::spawn_blocking(move || verify(password, &password_hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// Burn one comparison against the dummy hash. Always `false`.
    pub async fn verify_against_dummy(&self, password: &str) -> bool {
        self.verify_password(password, &self.dummy_hash).await;
        false
    }
}
