//! Builds the process-wide `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    AuthConfig, AuthService,
    jwks::{CachedKeySource, HttpKeySource, KeySource},
};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, reqwest::Error> {
    let http = HttpKeySource::new(config.auth_jwks_url.as_str())?;

    // A zero TTL keeps the re-fetch-per-verification behaviour.
    let keys: Arc<dyn KeySource> = if config.jwks_cache_ttl.is_zero() {
        Arc::new(http)
    } else {
        Arc::new(CachedKeySource::new(http, config.jwks_cache_ttl))
    };

    let mut auth_config = AuthConfig::new(&config.auth_issuer, &config.auth_audience);
    auth_config.allowed_algorithms = config.auth_allowed_algorithms.clone();
    auth_config.leeway_seconds = config.access_token_leeway_seconds;

    tracing::info!(
        issuer = %auth_config.issuer,
        audience = %auth_config.audience,
        jwks_url = %config.auth_jwks_url,
        cache_ttl_secs = config.jwks_cache_ttl.as_secs(),
        "access token verification configured"
    );

    Ok(Arc::new(AuthService::new(auth_config, keys)))
}
