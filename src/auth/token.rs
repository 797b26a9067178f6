// src/auth/token.rs
//! Session token issuing and verification
//!
//! Stateless sessions: validity is determined entirely by signature and
//! expiry at verification time, nothing is persisted server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::str::FromStr;

use super::models::SessionClaims;
use crate::common::config::ConfigError;
use crate::common::error::AuthError;

pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl SessionTokenCodec {
    /// Build a codec from the configured secret, algorithm name and default
    /// token lifetime
    ///
    /// An empty secret, a non-HMAC algorithm or a non-positive lifetime is a
    /// startup-class error: the service must refuse to serve requests rather
    /// than discover the problem on the first login.
    pub fn new(secret: &str, algorithm: &str, ttl_minutes: i64) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                var: "API_SECRET_KEY",
                reason: "must be non-empty".to_string(),
            });
        }

        let algorithm = Algorithm::from_str(algorithm).map_err(|_| ConfigError::InvalidVar {
            var: "API_TOKEN_ALGORITHM",
            reason: format!("unknown algorithm {}", algorithm),
        })?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::InvalidVar {
                var: "API_TOKEN_ALGORITHM",
                reason: "session tokens use a shared secret; pick HS256, HS384 or HS512"
                    .to_string(),
            });
        }

        if ttl_minutes <= 0 {
            return Err(ConfigError::InvalidVar {
                var: "API_TOKEN_EXPIRE_MINUTES",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// Issue a session token for `uid` with the configured default lifetime
    pub fn issue(&self, uid: &str) -> Result<String, AuthError> {
        self.issue_with_ttl(uid, self.default_ttl)
    }

    pub fn issue_with_ttl(&self, uid: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: uid.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {}", e)))
    }

    /// Verify a session token and return its claims
    ///
    /// The expiry boundary is exclusive: a token checked exactly at `exp`
    /// is already expired. Decode failures other than expiry collapse into
    /// the generic `InvalidToken` so internals never leak to the caller.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let decoded = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        if Utc::now().timestamp() >= decoded.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(decoded.claims)
    }
}
