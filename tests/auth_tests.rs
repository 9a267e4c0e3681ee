//! Credential verifier tests

use animal_registry::auth::{
    AuthError, AuthVerifier, JwtAuthVerifier, JwtConfig, StaticTokenVerifier, TokenClaims,
};
use animal_registry::UserId;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "registry-test-secret";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn sign(claims: &TokenClaims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn expires_in(minutes: i64) -> Option<i64> {
    Some((Utc::now() + Duration::minutes(minutes)).timestamp())
}

mod static_verifier_tests {
    use super::*;

    #[test]
    fn test_known_tokens_resolve() {
        let rt = runtime();
        rt.block_on(async {
            let verifier = StaticTokenVerifier::new()
                .with_token("alpha", "u1")
                .with_token("beta", "u2");

            assert_eq!(verifier.resolve("alpha").await.unwrap().as_str(), "u1");
            assert_eq!(verifier.resolve("beta").await.unwrap().as_str(), "u2");
        });
    }

    #[test]
    fn test_token_lookup_is_exact() {
        let rt = runtime();
        rt.block_on(async {
            let verifier = StaticTokenVerifier::new().with_token("alpha", "u1");

            for token in ["Alpha", " alpha", "alpha ", "alp"] {
                assert_eq!(
                    verifier.resolve(token).await,
                    Err(AuthError::Unauthorized),
                    "token {token:?}"
                );
            }
        });
    }
}

mod jwt_verifier_tests {
    use super::*;

    fn verifier() -> JwtAuthVerifier {
        JwtAuthVerifier::new(JwtConfig::new(SECRET))
    }

    #[test]
    fn test_issued_token_resolves_to_user() {
        let rt = runtime();
        rt.block_on(async {
            let verifier = verifier();
            let token = verifier
                .issue_token(&UserId::new("u1"), Duration::hours(1))
                .unwrap();

            assert_eq!(verifier.resolve(&token).await.unwrap(), UserId::new("u1"));
        });
    }

    #[test]
    fn test_malformed_and_empty_tokens_unauthorized() {
        let rt = runtime();
        rt.block_on(async {
            let verifier = verifier();
            for token in ["", "   ", "not-a-jwt", "a.b.c"] {
                assert_eq!(
                    verifier.resolve(token).await,
                    Err(AuthError::Unauthorized),
                    "token {token:?}"
                );
            }
        });
    }

    #[test]
    fn test_expired_token_unauthorized() {
        let rt = runtime();
        rt.block_on(async {
            let token = sign(&TokenClaims {
                id: Some("u1".to_string()),
                exp: expires_in(-30),
                ..Default::default()
            });
            assert_eq!(
                verifier().resolve(&token).await,
                Err(AuthError::Unauthorized)
            );
        });
    }

    #[test]
    fn test_missing_expiry_depends_on_config() {
        let rt = runtime();
        rt.block_on(async {
            let token = sign(&TokenClaims {
                id: Some("u1".to_string()),
                ..Default::default()
            });
            assert_eq!(
                verifier().resolve(&token).await,
                Err(AuthError::Unauthorized)
            );

            let mut config = JwtConfig::new(SECRET);
            config.require_expiry = false;
            let lenient = JwtAuthVerifier::new(config);
            assert_eq!(lenient.resolve(&token).await.unwrap(), UserId::new("u1"));
        });
    }

    #[test]
    fn test_valid_token_without_identity() {
        let rt = runtime();
        rt.block_on(async {
            let verifier = verifier();

            let no_id = sign(&TokenClaims {
                exp: expires_in(10),
                ..Default::default()
            });
            assert_eq!(
                verifier.resolve(&no_id).await,
                Err(AuthError::IdentityUnresolved)
            );

            let blank_id = sign(&TokenClaims {
                id: Some("  ".to_string()),
                exp: expires_in(10),
                ..Default::default()
            });
            assert_eq!(
                verifier.resolve(&blank_id).await,
                Err(AuthError::IdentityUnresolved)
            );
        });
    }

    #[test]
    fn test_issuer_checked_when_configured() {
        let rt = runtime();
        rt.block_on(async {
            let mut config = JwtConfig::new(SECRET);
            config.issuer = Some("zoo".to_string());
            let verifier = JwtAuthVerifier::new(config);

            let foreign = sign(&TokenClaims {
                id: Some("u1".to_string()),
                exp: expires_in(10),
                iss: Some("aquarium".to_string()),
                ..Default::default()
            });
            assert_eq!(
                verifier.resolve(&foreign).await,
                Err(AuthError::Unauthorized)
            );

            let own = verifier
                .issue_token(&UserId::new("u1"), Duration::minutes(10))
                .unwrap();
            assert!(verifier.resolve(&own).await.is_ok());
        });
    }
}
