//! Session token utilities using RS256-signed JWTs.
//!
//! Browser sessions are represented by a signed JWT carried in an httpOnly
//! cookie. The token embeds the account id and role so role checks do not
//! require a database round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,
    /// Account role (participant, organizer, admin)
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token id (unique per session)
    pub jti: String,
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Configuration for session token generation and validation.
#[derive(Clone)]
pub struct TokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    /// Session lifetime in seconds
    pub session_ttl_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("algorithm", &self.algorithm)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenConfig {
    /// Creates a new TokenConfig from an RSA key pair in PEM format.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        session_ttl_secs: i64,
    ) -> Result<Self, TokenError> {
        Self::with_leeway(
            private_key_pem,
            public_key_pem,
            session_ttl_secs,
            DEFAULT_LEEWAY_SECS,
        )
    }

    /// Creates a new TokenConfig with a custom clock-skew leeway.
    pub fn with_leeway(
        private_key_pem: &str,
        public_key_pem: &str,
        session_ttl_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| TokenError::InvalidKey(format!("Invalid private key: {}", e)))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| TokenError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
            session_ttl_secs,
            leeway_secs,
        })
    }

    /// Creates a TokenConfig for testing with an HS256 symmetric key.
    /// DO NOT use in production - only for tests.
    #[cfg(test)]
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            session_ttl_secs: 3600,
            leeway_secs: 0,
        }
    }

    /// Generates a session token for the given account.
    ///
    /// Returns `(token, jti)`.
    pub fn generate_session_token(
        &self,
        account_id: Uuid,
        role: &str,
    ) -> Result<(String, String), TokenError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.session_ttl_secs)).timestamp();

        let claims = Claims {
            sub: account_id.to_string(),
            role: role.to_string(),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a session token and returns its claims.
    pub fn validate_session_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidToken,
                _ => TokenError::DecodingError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_roundtrip() {
        let config = TokenConfig::new_for_testing("test-secret");
        let account_id = Uuid::new_v4();

        let (token, jti) = config
            .generate_session_token(account_id, "participant")
            .unwrap();
        let claims = config.validate_session_token(&token).unwrap();

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.role, "participant");
        assert_eq!(claims.jti, jti);
    }

    #[test]
    fn test_role_preserved_in_claims() {
        let config = TokenConfig::new_for_testing("test-secret");
        let (token, _) = config
            .generate_session_token(Uuid::new_v4(), "organizer")
            .unwrap();

        let claims = config.validate_session_token(&token).unwrap();
        assert_eq!(claims.role, "organizer");
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let config = TokenConfig::new_for_testing("test-secret");
        assert!(config.validate_session_token("not.a.token").is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_key() {
        let config_a = TokenConfig::new_for_testing("secret-a");
        let config_b = TokenConfig::new_for_testing("secret-b");

        let (token, _) = config_a
            .generate_session_token(Uuid::new_v4(), "admin")
            .unwrap();
        assert!(config_b.validate_session_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = TokenConfig::new_for_testing("test-secret");
        config.session_ttl_secs = -60;

        let (token, _) = config
            .generate_session_token(Uuid::new_v4(), "participant")
            .unwrap();
        let err = config.validate_session_token(&token).unwrap_err();
        assert!(matches!(err, TokenError::TokenExpired));
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = TokenConfig::new_for_testing("test-secret");
        let id = Uuid::new_v4();

        let (_, jti1) = config.generate_session_token(id, "participant").unwrap();
        let (_, jti2) = config.generate_session_token(id, "participant").unwrap();
        assert_ne!(jti1, jti2);
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let result = TokenConfig::new("not a pem", "also not a pem", 3600);
        assert!(matches!(result, Err(TokenError::InvalidKey(_))));
    }
}
