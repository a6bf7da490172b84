use crate::error::{AppError, Result};

/// bcrypt is CPU bound, so both calls run on the blocking pool.
pub async fn hash_password(plaintext: &str, cost: u32) -> Result<String> {
    let plaintext = plaintext.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
}

pub async fn verify_password(plaintext: &str, hash: &str) -> Result<bool> {
    let plaintext = plaintext.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|e| AppError::InternalError(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))
}
