//! Password hashing

use crate::error::{Error, Result};

/// bcrypt hashing with a fixed cost, plus a dummy hash for unknown accounts
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| Error::Other(format!("hashing task failed: {}", e)))??;
        Ok(hashed)
    }

    /// Verify a password against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| Error::Other(format!("verification task failed: {}", e)))??;
        Ok(valid)
    }

    /// Spend the same work as a real verification when there is no account
    pub async fn verify_dummy(&self, password: &str) -> Result<bool> {
        let dummy = self.dummy_hash.clone();
        self.verify(password, &dummy).await.map(|_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        let hash = hasher.hash("secret1").await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1", &hash).await.unwrap());
        assert!(!hasher.verify("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        let a = hasher.hash("secret1").await.unwrap();
        let b = hasher.hash("secret1").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_dummy_never_matches() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST).unwrap();
        assert!(!hasher.verify_dummy("anything").await.unwrap());
    }
}
