//! Password hashing and bearer-token issuance.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{PasswordDigest, Role, User, UserId};
use super::error::PortalError;

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Argon2id hasher producing PHC strings.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Custom cost parameters, e.g. cheap ones for tests. Rejected parameters are a server fault.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PortalError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|err| {
            PortalError::Unavailable(format!("invalid argon2 parameters: {err}"))
        })?;
        Ok(Self { params })
    }

    pub fn hash(&self, password: &str) -> Result<PasswordDigest, PortalError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordDigest::new(hash.to_string()))
            .map_err(|err| {
                tracing::error!(error = %err, "password hashing failed");
                PortalError::Unavailable("password hashing failed".to_string())
            })
    }

    /// Parameters are read back from the digest, so hashes made under older settings still verify.
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        match PasswordHash::new(digest.as_str()) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                tracing::warn!(error = %err, "stored password digest is malformed");
                false
            }
        }
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> UserId {
        UserId(self.sub.clone())
    }
}

/// HS256 token issuer and verifier.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, PortalError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.0.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "failed to sign session token");
            PortalError::Unavailable("failed to issue session token".to_string())
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, PortalError> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "session token rejected");
                match err.kind() {
                    JwtErrorKind::ExpiredSignature => {
                        PortalError::unauthorized("session token expired")
                    }
                    _ => PortalError::unauthorized("invalid session token"),
                }
            })
    }
}
