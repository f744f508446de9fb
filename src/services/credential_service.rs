use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::AppError;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly generated password-reset token.
pub struct ResetToken {
    /// Mailed to the user, never stored.
    pub raw: String,
    /// Stored on the user record.
    pub digest: String,
    pub expires_at: i64,
}

/// Password hashing, token signing and reset-token digests.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    reset_ttl: Duration,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::days(config.jwt_expires_days),
            reset_ttl: Duration::minutes(config.reset_token_ttl_minutes),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub fn hash_password(&self, plaintext: &str) -> Result<String, AppError> {
        hash(plaintext, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(&self, plaintext: &str, hashed: &str) -> bool {
        match verify(plaintext, hashed) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("⚠️  Password verification error: {}", e);
                false
            }
        }
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        self.sign(Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    fn sign(&self, claims: Claims) -> Result<String, AppError> {
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Returns the user id the token was issued for.
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }

    /// Deterministic SHA-256 hex digest; the only form of a reset token that is persisted.
    pub fn hash_reset_token(raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }

    pub fn generate_reset_token(&self) -> ResetToken {
        let raw = Uuid::new_v4().simple().to_string();
        let digest = Self::hash_reset_token(&raw);
        ResetToken {
            raw,
            digest,
            expires_at: (Utc::now() + self.reset_ttl).timestamp_millis(),
        }
    }
}
