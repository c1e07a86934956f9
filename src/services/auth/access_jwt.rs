use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;

use crate::services::auth::{
    claims::Claims,
    error::AuthError,
    jwks::{KeySource, SigningKey},
};

/// What an access token has to match to be accepted.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Header `alg` values accepted. Anything else is rejected before the
    /// signature is looked at.
    pub allowed_algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
}

impl AuthConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            allowed_algorithms: vec![Algorithm::RS256],
            leeway_seconds: 0,
        }
    }
}

#[derive(Deserialize)]
struct UnverifiedExpiry {
    #[serde(default)]
    exp: Option<u64>,
}

/// RS256 access-token verifier backed by the issuer's rotating key set.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    validation: Validation,
    keys: Arc<dyn KeySource>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(config: AuthConfig, keys: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = config.allowed_algorithms.clone();
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = config.leeway_seconds;

        Self {
            config,
            validation,
            keys,
        }
    }

    /// Verify a compact JWS and return its claims.
    ///
    /// Order of checks:
    /// 1. header parses and names a `kid`
    /// 2. header `alg` is allow-listed
    /// 3. `kid` resolves in the key set (one refresh on miss)
    /// 4. `exp` is not in the past
    /// 5. signature, `iss` and `aud`
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("token header has no key id".into()))?;

        if !self.config.allowed_algorithms.contains(&header.alg) {
            tracing::warn!(alg = ?header.alg, "token signed with a disallowed algorithm");
            return Err(AuthError::SignatureInvalid);
        }

        let key = self.resolve_key(&kid).await?;

        self.reject_expired(token)?;

        let decoding_key = key.decoding_key().map_err(|e| {
            tracing::warn!(kid = %kid, error = %e, "published key is not a usable RSA key");
            AuthError::SignatureInvalid
        })?;

        // Decoded untyped first: jsonwebtoken deserializes the payload before
        // checking required claims, so a typed decode would report a missing
        // `exp`/`iss`/`aud` as a JSON error.
        let data = jsonwebtoken::decode::<serde_json::Value>(token, &decoding_key, &self.validation)
            .map_err(classify)?;

        serde_json::from_value(data.claims).map_err(|e| AuthError::MalformedToken(e.to_string()))
    }

    async fn resolve_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        let keys = self.keys.key_set().await?;
        if let Some(key) = keys.get(kid) {
            return Ok(key.clone());
        }

        // The issuer may have rotated keys since the set was fetched.
        if let Some(refreshed) = self.keys.refresh().await?
            && let Some(key) = refreshed.get(kid)
        {
            tracing::info!(kid = %kid, "signing key found after refresh");
            return Ok(key.clone());
        }

        Err(AuthError::UnknownSigningKey {
            kid: kid.to_string(),
        })
    }

    // An expired token is reported as such whether or not its signature holds.
    fn reject_expired(&self, token: &str) -> Result<(), AuthError> {
        let Ok(data) = jsonwebtoken::dangerous::insecure_decode::<UnverifiedExpiry>(token) else {
            // Let full verification report the structural problem.
            return Ok(());
        };

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        match data.claims.exp {
            Some(exp) if exp.saturating_add(self.config.leeway_seconds) < now => {
                Err(AuthError::TokenExpired)
            }
            _ => Ok(()),
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimsMismatch,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat => AuthError::SignatureInvalid,
        _ => AuthError::MalformedToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::{
        claims::Audience,
        jwks::CachedKeySource,
        test_support::{
            AUDIENCE, ISSUER, JWKS, PRIMARY_PEM, ROGUE_PEM, ROTATED_JWKS, StaticKeys,
            UnavailableKeys, auth_config, auth_service, claims_with, key_set, now, sign_with,
            token_for,
        },
    };
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn round_trip_returns_original_claims() {
        let claims = Claims {
            iss: ISSUER.into(),
            aud: Audience::One(AUDIENCE.into()),
            exp: now() + 600,
            sub: Some("auth0|manager".into()),
            iat: Some(now()),
            permissions: Some(vec!["get:drinks-detail".into(), "post:drinks".into()]),
        };

        let verified = auth_service().verify(&token_for(&claims)).await.unwrap();
        assert_eq!(verified, claims);
    }

    #[tokio::test]
    async fn audience_array_is_accepted() {
        let mut claims = claims_with(&[]);
        claims["aud"] = json!(["https://other/", AUDIENCE]);

        let verified = auth_service().verify(&token_for(&claims)).await.unwrap();
        assert_eq!(
            verified.aud,
            Audience::Many(vec!["https://other/".into(), AUDIENCE.into()])
        );
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        for token in ["", "not-a-jwt", "abc.def.ghi"] {
            let err = auth_service().verify(token).await.unwrap_err();
            assert!(matches!(err, AuthError::MalformedToken(_)), "{token}: {err:?}");
        }
    }

    #[tokio::test]
    async fn header_without_kid_is_malformed() {
        let token = sign_with(Algorithm::RS256, None, &claims_with(&[]), PRIMARY_PEM);
        let err = auth_service().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = sign_with(Algorithm::RS256, Some("next"), &claims_with(&[]), ROGUE_PEM);
        let err = auth_service().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownSigningKey { kid } if kid == "next"));
    }

    #[tokio::test]
    async fn signature_from_another_key_is_invalid() {
        // Claims the `abc` kid but is signed by a different private key.
        let token = sign_with(Algorithm::RS256, Some("abc"), &claims_with(&[]), ROGUE_PEM);
        let err = auth_service().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));
    }

    #[tokio::test]
    async fn tampered_payload_is_invalid() {
        let token = token_for(&claims_with(&["get:drinks-detail"]));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = claims_with(&["get:drinks-detail", "delete:drinks"]);
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let err = auth_service().verify(&parts.join(".")).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));
    }

    #[tokio::test]
    async fn disallowed_algorithm_is_rejected() {
        let token = sign_with(Algorithm::RS512, Some("abc"), &claims_with(&[]), PRIMARY_PEM);
        let err = auth_service().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));

        // The same token passes once RS512 is explicitly allowed.
        let mut config = auth_config();
        config.allowed_algorithms = vec![Algorithm::RS256, Algorithm::RS512];
        let service = AuthService::new(config, Arc::new(StaticKeys(key_set(JWKS))));
        assert!(service.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn hmac_substitution_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT","kid":"abc"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims_with(&[])).unwrap());
        let token = format!("{header}.{payload}.c2lnbmF0dXJl");

        let err = auth_service().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::SignatureInvalid));
    }

    #[tokio::test]
    async fn expired_token_is_expired_regardless_of_signature() {
        let mut claims = claims_with(&["get:drinks-detail"]);
        claims["exp"] = json!(now() - 120);

        let signed = token_for(&claims);
        let err = auth_service().verify(&signed).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));

        let forged = sign_with(Algorithm::RS256, Some("abc"), &claims, ROGUE_PEM);
        let err = auth_service().verify(&forged).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn leeway_tolerates_small_clock_skew() {
        let mut claims = claims_with(&[]);
        claims["exp"] = json!(now() - 5);

        let mut config = auth_config();
        config.leeway_seconds = 60;
        let service = AuthService::new(config, Arc::new(StaticKeys(key_set(JWKS))));
        assert!(service.verify(&token_for(&claims)).await.is_ok());
    }

    #[tokio::test]
    async fn issuer_or_audience_mismatch() {
        let mut wrong_aud = claims_with(&[]);
        wrong_aud["aud"] = json!("another-api");
        let err = auth_service().verify(&token_for(&wrong_aud)).await.unwrap_err();
        assert!(matches!(err, AuthError::ClaimsMismatch));

        let mut wrong_iss = claims_with(&[]);
        wrong_iss["iss"] = json!("https://evil/");
        let err = auth_service().verify(&token_for(&wrong_iss)).await.unwrap_err();
        assert!(matches!(err, AuthError::ClaimsMismatch));
    }

    #[tokio::test]
    async fn missing_registered_claims_are_claims_mismatch() {
        for missing in ["exp", "iss", "aud"] {
            let mut claims = claims_with(&[]);
            claims.as_object_mut().unwrap().remove(missing);

            let err = auth_service().verify(&token_for(&claims)).await.unwrap_err();
            assert!(matches!(err, AuthError::ClaimsMismatch), "{missing}: {err:?}");
            assert_eq!(err.status_code(), 401);
        }
    }

    #[tokio::test]
    async fn mistyped_private_claim_is_malformed() {
        let mut claims = claims_with(&[]);
        claims["permissions"] = json!("get:drinks-detail");

        let err = auth_service().verify(&token_for(&claims)).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)), "{err:?}");
    }

    #[tokio::test]
    async fn key_source_outage_propagates() {
        let service = AuthService::new(auth_config(), Arc::new(UnavailableKeys));
        let err = service.verify(&token_for(&claims_with(&[]))).await.unwrap_err();
        assert!(matches!(err, AuthError::KeySourceUnavailable(_)));
    }

    #[tokio::test]
    async fn rotated_key_is_picked_up_on_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ROTATED_JWKS, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let http = crate::services::auth::jwks::HttpKeySource::new(format!(
            "{}/jwks.json",
            server.uri()
        ))
        .unwrap();
        let keys = CachedKeySource::new(http, Duration::from_secs(300))
            .with_min_refresh_interval(Duration::ZERO);
        let service = AuthService::new(auth_config(), Arc::new(keys));

        // Warm the cache with the pre-rotation set.
        let old = token_for(&claims_with(&[]));
        assert!(service.verify(&old).await.is_ok());

        let new = sign_with(Algorithm::RS256, Some("next"), &claims_with(&[]), ROGUE_PEM);
        assert!(service.verify(&new).await.is_ok());
        // Served from the refreshed cache.
        assert!(service.verify(&new).await.is_ok());
    }
}
