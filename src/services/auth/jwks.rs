//! Signing-key resolution from the issuer's published JWKS document.
//!
//! - `HttpKeySource` fetches `https://<issuer>/.well-known/jwks.json` on every call.
//! - `CachedKeySource` puts a TTL-bounded cache in front of any source. Cache
//!   misses are single-flight: concurrent callers wait on one upstream fetch.
//! - Fetch and parse failures surface as `AuthError::KeySourceUnavailable`,
//!   never as an authentication failure.
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::services::auth::error::AuthError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lower bound between forced refreshes, so a stream of tokens carrying
/// unknown `kid`s cannot hammer the issuer.
const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// RSA public key published by the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub key_id: String,
    pub key_type: String,
    pub usage: Option<String>,
    /// Base64url modulus (`n`).
    pub modulus: String,
    /// Base64url exponent (`e`).
    pub exponent: String,
}

impl SigningKey {
    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        DecodingKey::from_rsa_components(&self.modulus, &self.exponent)
    }
}

/// Signing keys indexed by `kid`.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, SigningKey>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: Option<String>,
    #[serde(rename = "use")]
    usage: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

impl JwkEntry {
    fn into_signing_key(self) -> Option<SigningKey> {
        let key_type = self.kty?;
        if key_type != "RSA" {
            return None;
        }
        // Encryption keys can share the document; they never verify signatures.
        if self.usage.as_deref().is_some_and(|u| u != "sig") {
            return None;
        }

        let modulus = self.n?;
        let exponent = self.e?;
        if URL_SAFE_NO_PAD.decode(&modulus).is_err() || URL_SAFE_NO_PAD.decode(&exponent).is_err()
        {
            return None;
        }

        Some(SigningKey {
            key_id: self.kid?,
            key_type,
            usage: self.usage,
            modulus,
            exponent,
        })
    }
}

impl KeySet {
    /// Parse a JWKS document. Entries that cannot verify an RSA signature
    /// are skipped; a document without a `keys` array is an error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AuthError> {
        let doc: JwksDocument = serde_json::from_slice(bytes)
            .map_err(|e| AuthError::KeySourceUnavailable(format!("invalid JWKS document: {e}")))?;

        let total = doc.keys.len();
        let set: KeySet = doc
            .keys
            .into_iter()
            .filter_map(JwkEntry::into_signing_key)
            .collect();

        if set.len() < total {
            tracing::debug!(
                skipped = total - set.len(),
                "ignored JWKS entries that are not usable RSA signing keys"
            );
        }

        Ok(set)
    }

    pub fn get(&self, key_id: &str) -> Option<&SigningKey> {
        self.keys.get(key_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

impl FromIterator<SigningKey> for KeySet {
    fn from_iter<I: IntoIterator<Item = SigningKey>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|key| (key.key_id.clone(), key))
                .collect(),
        }
    }
}

/// Where the verifier gets its signing keys from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Current key set.
    async fn key_set(&self) -> Result<Arc<KeySet>, AuthError>;

    /// Called when a token names a `kid` the current set does not contain.
    ///
    /// Returns `Ok(None)` when the source cannot offer a fresher view than
    /// `key_set` already did.
    async fn refresh(&self) -> Result<Option<Arc<KeySet>>, AuthError> {
        Ok(None)
    }
}

/// Fetches the JWKS document over HTTP(S) on every call.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    jwks_url: String,
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            client,
        })
    }

    async fn fetch(&self) -> Result<KeySet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeySourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeySourceUnavailable(format!(
                "HTTP {status} from JWKS endpoint"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::KeySourceUnavailable(e.to_string()))?;

        KeySet::from_json(&body)
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        match self.fetch().await {
            Ok(keys) => {
                tracing::debug!(url = %self.jwks_url, keys = keys.len(), "fetched signing keys");
                Ok(Arc::new(keys))
            }
            Err(err) => {
                tracing::warn!(url = %self.jwks_url, error = %err, "signing key fetch failed");
                Err(err)
            }
        }
    }
}

struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

/// TTL-bounded cache with single-flight refresh in front of another source.
pub struct CachedKeySource<S> {
    inner: S,
    ttl: Duration,
    min_refresh_interval: Duration,
    entry: RwLock<Option<CacheEntry>>,
    // Held for the whole upstream fetch; waiters re-check the entry afterwards.
    refresh_lock: Mutex<()>,
}

impl<S: KeySource> CachedKeySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            entry: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    async fn cached_within(&self, max_age: Duration) -> Option<Arc<KeySet>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < max_age)
            .map(|e| e.keys.clone())
    }

    async fn load(&self, max_age: Duration) -> Result<Arc<KeySet>, AuthError> {
        let _flight = self.refresh_lock.lock().await;

        // Another caller may have finished a fetch while we waited.
        if let Some(keys) = self.cached_within(max_age).await {
            return Ok(keys);
        }

        let keys = self.inner.key_set().await?;
        *self.entry.write().await = Some(CacheEntry {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }
}

#[async_trait]
impl<S: KeySource> KeySource for CachedKeySource<S> {
    async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        if let Some(keys) = self.cached_within(self.ttl).await {
            return Ok(keys);
        }
        self.load(self.ttl).await
    }

    async fn refresh(&self) -> Result<Option<Arc<KeySet>>, AuthError> {
        self.load(self.min_refresh_interval).await.map(Some)
    }
}
