use crate::error::AppResult;

/// Hash a plaintext password for storage. bcrypt salts internally, so two
/// hashes of the same input differ.
pub fn hash(plaintext: &str) -> AppResult<String> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Verify a candidate password against a stored hash - constant-time via bcrypt.
/// A malformed hash verifies as false rather than erroring.
pub fn verify(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
