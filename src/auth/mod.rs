//! Credential verification
//!
//! An `AuthVerifier` turns an opaque credential into a confirmed `UserId` in a
//! single call, so "is this token valid" and "whose token is this" can never
//! disagree.
//!
//! Implementations:
//! - `StaticTokenVerifier`: fixed token table (local mode, tests)
//! - `jwt::JwtAuthVerifier`: HS256 JSON Web Tokens carrying the user id

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::models::UserId;

pub mod jwt;

pub use jwt::{JwtAuthVerifier, JwtConfig, TokenClaims};

/// Error type for credential verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The credential is missing, malformed, expired or not recognised
    #[error("Unauthorized")]
    Unauthorized,
    /// The credential was accepted but carries no usable identity
    #[error("User ID could not be retrieved from auth token")]
    IdentityUnresolved,
    /// The verifier itself failed
    #[error("Auth backend error: {0}")]
    Backend(String),
}

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Trait for credential verifiers
#[async_trait(?Send)]
pub trait AuthVerifier: Send + Sync {
    /// Resolve a credential to the identity it was issued for
    async fn resolve(&self, token: &str) -> AuthResult<UserId>;
}

/// Verifier backed by a fixed token table
///
/// # Example
///
/// ```rust
/// use animal_registry::auth::StaticTokenVerifier;
///
/// let verifier = StaticTokenVerifier::new()
///     .with_token("secret-token", "u1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Option<UserId>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a credential for `user`
    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<String>) -> Self {
        self.tokens
            .insert(token.into(), Some(UserId::new(user.into())));
        self
    }

    /// Accept `token` without attaching an identity to it
    ///
    /// Resolving such a token yields `AuthError::IdentityUnresolved`.
    pub fn with_anonymous_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), None);
        self
    }
}

#[async_trait(?Send)]
impl AuthVerifier for StaticTokenVerifier {
    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        match self.tokens.get(token) {
            Some(Some(user)) => Ok(user.clone()),
            Some(None) => Err(AuthError::IdentityUnresolved),
            None => {
                debug!("Rejected unknown static token");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
