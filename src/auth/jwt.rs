//! JWT credential verification
//!
//! Tokens are HS256-signed and carry the user id in an `id` claim. Issuer and
//! audience are only checked when configured.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthError, AuthResult, AuthVerifier};
use crate::models::UserId;

/// Claims understood by the verifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// User id the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Issued at (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// JWT verification settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    /// Reject tokens without an `exp` claim
    #[serde(default = "default_require_expiry")]
    pub require_expiry: bool,
}

fn default_require_expiry() -> bool {
    true
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: None,
            audience: None,
            require_expiry: default_require_expiry(),
        }
    }
}

/// Verifier for HS256 JSON Web Tokens
#[derive(Clone)]
pub struct JwtAuthVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtAuthVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for `user` that expires after `ttl`
    pub fn issue_token(&self, user: &UserId, ttl: Duration) -> AuthResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            id: Some(user.as_str().to_string()),
            iat: Some(now.timestamp()),
            exp: Some((now + ttl).timestamp()),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Backend(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature and registered claims, returning the payload
    pub fn decode_claims(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if !self.config.require_expiry {
            validation.required_spec_claims.clear();
        }

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {:?}", e.kind());
                AuthError::Unauthorized
            })
    }
}

#[async_trait(?Send)]
impl AuthVerifier for JwtAuthVerifier {
    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        if token.trim().is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let claims = self.decode_claims(token)?;
        claims
            .id
            .filter(|id| !id.trim().is_empty())
            .map(UserId::new)
            .ok_or(AuthError::IdentityUnresolved)
    }
}
