//! Password hashing

use crate::error::Result;

/// bcrypt hasher with a fixed cost factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password with a fresh salt
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match bcrypt::verify(plaintext, hashed) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, plaintext: String, hashed: String) -> Result<bool> {
        let hasher = *self;
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hashed)).await?)
    }

    /// Verify a sign-in attempt against an account that may not exist.
    ///
    /// Without a stored hash the plaintext is hashed at the configured cost
    /// and the attempt fails, so both outcomes take the same bcrypt time.
    pub async fn verify_account_blocking(
        &self,
        plaintext: String,
        hashed: Option<String>,
    ) -> Result<bool> {
        match hashed {
            Some(hashed) => self.verify_blocking(plaintext, hashed).await,
            None => {
                self.hash_blocking(plaintext).await?;
                Ok(false)
            }
        }
    }
}
