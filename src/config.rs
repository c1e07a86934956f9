/*
 * Responsibility
 * - Read settings from the environment (PORT, DATABASE_URL, CORS, Auth)
 * - Validate them up front (missing or invalid values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    // None: drinks are kept in process memory
    pub database_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: Url,
    pub auth_allowed_algorithms: Vec<Algorithm>,
    pub access_token_leeway_seconds: u64,
    pub jwks_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = var("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let app_env = var("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        // e.g. `coffeeshop.us.auth0.com`
        let auth_domain = var("AUTH_DOMAIN")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let auth_issuer = match (var("AUTH_ISSUER"), &auth_domain) {
            (Some(issuer), _) => issuer,
            (None, Some(domain)) => format!("https://{domain}/"),
            (None, None) => return Err(ConfigError::Missing("AUTH_DOMAIN")),
        };

        let jwks_url = match (var("AUTH_JWKS_URL"), &auth_domain) {
            (Some(url), _) => url,
            (None, Some(domain)) => format!("https://{domain}/.well-known/jwks.json"),
            (None, None) => return Err(ConfigError::Missing("AUTH_DOMAIN")),
        };
        let auth_jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
        match auth_jwks_url.scheme() {
            "https" => {}
            // Plain HTTP is only tolerated for local issuers during development.
            "http" if !app_env.is_production() => {}
            _ => return Err(ConfigError::Invalid("AUTH_JWKS_URL")),
        }

        let auth_audience = var("AUTH_AUDIENCE")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let auth_allowed_algorithms = match var("AUTH_ALLOWED_ALGORITHMS") {
            Some(list) => parse_algorithms(&list)?,
            None => vec![Algorithm::RS256],
        };

        let access_token_leeway_seconds = match var("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let jwks_cache_ttl = match var("JWKS_CACHE_TTL_SECONDS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("JWKS_CACHE_TTL_SECONDS"))?,
            ),
            None => Duration::from_secs(300),
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            auth_allowed_algorithms,
            access_token_leeway_seconds,
            jwks_cache_ttl,
        })
    }
}

// Keys come from an RSA key set, so only RSA-family algorithms make sense.
fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg =
            Algorithm::from_str(name).map_err(|_| ConfigError::Invalid("AUTH_ALLOWED_ALGORITHMS"))?;
        if !matches!(
            alg,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ) {
            return Err(ConfigError::Invalid("AUTH_ALLOWED_ALGORITHMS"));
        }
        if !algorithms.contains(&alg) {
            algorithms.push(alg);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid("AUTH_ALLOWED_ALGORITHMS"));
    }
    Ok(algorithms)
}
