//! Admin sessions: password verification and JWT issuance.
//!
//! Tokens are HS256 JWTs carrying a fixed admin identity and the single
//! [`ADMIN_ROLE`]. They are stateless; nothing is persisted per login.

use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{ServiceError, ServiceResult};
use crate::config::AppConfig;
use crate::repositories::AdminUserRepository;

/// The only role the system knows about.
pub const ADMIN_ROLE: &str = "Admin";
/// Subject and display name embedded in every token.
pub const ADMIN_SUBJECT: &str = "admin";
pub const TOKEN_TTL_HOURS: i64 = 8;
/// Clock skew tolerated when checking `exp`.
pub const LEEWAY_SECS: u64 = 120;

/// Verified against when the username is unknown, so both failure paths
/// spend the same hashing time.
const TIMING_DECOY_PASSWORD: &str = "backoffice-timing-decoy";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminClaims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AdminClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at_utc: DateTime<Utc>,
}

/// Hash a password into an Argon2id PHC string with a random salt.
pub fn hash_password(plain_text: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain_text.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hash failed: {e}"))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(plain_text: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok(),
        Err(error) => {
            tracing::warn!(%error, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

pub struct SessionIssuer {
    signing_key: Zeroizing<Vec<u8>>,
    issuer: String,
    audience: String,
    decoy_hash: String,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("signing_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl SessionIssuer {
    pub fn new(signing_key: &[u8], issuer: &str, audience: &str) -> anyhow::Result<Self> {
        Ok(Self {
            signing_key: Zeroizing::new(signing_key.to_vec()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            decoy_hash: hash_password(TIMING_DECOY_PASSWORD)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let key = config.jwt_signing_key_bytes()?;
        Self::new(&key, &config.jwt_issuer, &config.jwt_audience)
    }

    /// Check credentials and issue a token on success.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller: both yield [`ServiceError::InvalidCredentials`].
    pub async fn login(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> ServiceResult<IssuedToken> {
        let admin = AdminUserRepository::new(db)
            .find_by_username(username.trim())
            .await?;

        let (stored_hash, known) = match &admin {
            Some(admin) => (admin.password_hash.clone(), true),
            None => (self.decoy_hash.clone(), false),
        };
        let candidate = password.to_string();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
                .await
                .map_err(|e| anyhow!("password verification task failed: {e}"))?;

        if !(known && matches) {
            counter!("admin_logins_total", "outcome" => "failure").increment(1);
            tracing::warn!("Admin login failed");
            return Err(ServiceError::InvalidCredentials);
        }

        counter!("admin_logins_total", "outcome" => "success").increment(1);
        tracing::info!("Admin login succeeded");
        self.issue()
    }

    pub fn issue(&self) -> ServiceResult<IssuedToken> {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> ServiceResult<IssuedToken> {
        let expires_at = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            name: ADMIN_SUBJECT.to_string(),
            role: ADMIN_ROLE.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| anyhow!("token signing failed: {e}"))?;

        Ok(IssuedToken {
            access_token,
            expires_at_utc: expires_at,
        })
    }

    /// Check signature, issuer, audience and expiry.
    pub fn validate(&self, token: &str) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = LEEWAY_SECS;

        decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .map(|data| data.claims)
    }
}
