use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task was cancelled")]
    TaskCancelled,
}

/// Hash a password with bcrypt at the given cost. Bcrypt is deliberately
/// slow, so the work runs on the blocking pool instead of a worker thread.
pub async fn hash_password(plain: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
        .map_err(PasswordError::from)
}

/// Verify a password against a stored bcrypt hash.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
        .map_err(PasswordError::from)
}
