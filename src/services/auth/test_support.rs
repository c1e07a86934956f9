//! Fixtures shared by the auth and handler tests: RSA key pairs, the
//! matching JWKS documents, and helpers to mint tokens.
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{Value, json};

use crate::services::auth::{
    AuthConfig, AuthService,
    error::AuthError,
    jwks::{KeySet, KeySource},
};

/// Private half of the `abc` key published in `JWKS`.
pub const PRIMARY_PEM: &str = include_str!("testdata/primary.pem");
/// Private half of the `next` key, only published in `ROTATED_JWKS`.
pub const ROGUE_PEM: &str = include_str!("testdata/rogue.pem");

pub const JWKS: &str = include_str!("testdata/jwks.json");
pub const ROTATED_JWKS: &str = include_str!("testdata/rotated_jwks.json");

pub const ISSUER: &str = "https://issuer/";
pub const AUDIENCE: &str = "api";

/// Key source that always answers with the same set.
pub struct StaticKeys(pub Arc<KeySet>);

#[async_trait]
impl KeySource for StaticKeys {
    async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        Ok(self.0.clone())
    }
}

/// Key source standing in for an unreachable issuer.
pub struct UnavailableKeys;

#[async_trait]
impl KeySource for UnavailableKeys {
    async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        Err(AuthError::KeySourceUnavailable("connection refused".into()))
    }
}

pub fn key_set(jwks: &str) -> Arc<KeySet> {
    Arc::new(KeySet::from_json(jwks.as_bytes()).expect("fixture JWKS parses"))
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(ISSUER, AUDIENCE)
}

pub fn auth_service() -> Arc<AuthService> {
    Arc::new(AuthService::new(
        auth_config(),
        Arc::new(StaticKeys(key_set(JWKS))),
    ))
}

pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

/// Payload accepted by `auth_service()`, with the given permissions.
pub fn claims_with(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|barista",
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

pub fn sign_with<T: Serialize>(alg: Algorithm, kid: Option<&str>, claims: &T, pem: &str) -> String {
    let mut header = Header::new(alg);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture PEM parses");
    jsonwebtoken::encode(&header, claims, &key).expect("fixture token signs")
}

/// RS256 token signed by the `abc` key.
pub fn token_for<T: Serialize>(claims: &T) -> String {
    sign_with(Algorithm::RS256, Some("abc"), claims, PRIMARY_PEM)
}
