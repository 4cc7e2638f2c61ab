use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Claims embedded in a password reset token. Nothing else is stored
/// server-side: validity is a function of the signature and `exp` alone,
/// so an issued token cannot be revoked before it expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// The user this token authorizes a password change for.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResetTokenError {
    #[error("reset token expired")]
    Expired,

    #[error("reset token invalid")]
    Invalid,
}

/// Issues and verifies HMAC-signed password reset tokens.
#[derive(Clone)]
pub struct ResetTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl ResetTokens {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Sign a token for the given user, expiring after the configured TTL.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = ResetClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode reset token: {e}")))
    }

    /// Returns the user id a token was issued for, or why it was rejected.
    /// Tampering and signature mismatch report as `Invalid`; only a
    /// well-signed token past its `exp` reports as `Expired`. Zero leeway.
    pub fn verify(&self, token: &str) -> Result<String, ResetTokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<ResetClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(ResetTokenError::Expired),
                _ => Err(ResetTokenError::Invalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";
    const TTL: u64 = 1800;

    fn tokens() -> ResetTokens {
        ResetTokens::new(SECRET, TTL)
    }

    /// Encode claims directly with the test secret, for expiry-window tests.
    fn raw_token(secret: &str, iat: i64, exp: i64) -> String {
        let claims = ResetClaims {
            sub: "user-1".to_string(),
            iat,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let tokens = tokens();
        let token = tokens.issue("user-42").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "user-42");
    }

    #[test]
    fn token_is_valid_just_before_expiry() {
        // Issued 1799s ago with a 1800s TTL: one second of validity left.
        let tokens = tokens();
        let now = Utc::now().timestamp();
        let token = raw_token(SECRET, now - 1799, now - 1799 + TTL as i64);
        assert_eq!(tokens.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn token_is_expired_just_after_expiry() {
        let tokens = tokens();
        let now = Utc::now().timestamp();
        let token = raw_token(SECRET, now - 1801, now - 1801 + TTL as i64);
        assert_eq!(tokens.verify(&token), Err(ResetTokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let tokens = tokens();
        let now = Utc::now().timestamp();
        let token = raw_token("some-other-secret", now, now + TTL as i64);
        assert_eq!(tokens.verify(&token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = tokens();
        let token = tokens.issue("user-42").unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        payload[0] = if payload[0] == 'A' { 'B' } else { 'A' };
        parts[1] = payload.into_iter().collect();
        let tampered = parts.join(".");

        assert_eq!(tokens.verify(&tampered), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = tokens();
        assert_eq!(
            tokens.verify("not-a-token"),
            Err(ResetTokenError::Invalid)
        );
        assert_eq!(tokens.verify(""), Err(ResetTokenError::Invalid));
    }
}
