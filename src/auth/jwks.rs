// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behavior
//!
//! - Keys are cached for a configurable TTL; a TTL of zero fetches the key
//!   set on every verification
//! - A cached set that lacks the requested key id is refetched once, so key
//!   rotation at the provider does not wait for the TTL
//! - Fetches are bounded by the HTTP client timeout
//!
//! A manager can also be built from a local key set, which never touches the
//! network.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default timeout for a JWKS fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

#[derive(Clone)]
enum KeySource {
    Remote { url: Url, client: reqwest::Client },
    Local(Arc<JwkSet>),
}

/// JWKS manager with caching.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct JwksManager {
    source: KeySource,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
}

impl JwksManager {
    /// Create a manager for a remote JWKS endpoint with the default fetch
    /// timeout.
    pub fn new(jwks_url: Url) -> Result<Self, AuthError> {
        Self::with_fetch_timeout(jwks_url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a manager for a remote JWKS endpoint.
    pub fn with_fetch_timeout(jwks_url: Url, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::JwksUnavailable(format!("HTTP client: {e}")))?;
        Ok(Self::with_http_client(jwks_url, client))
    }

    /// Create a manager that fetches with the given client.
    pub fn with_http_client(jwks_url: Url, client: reqwest::Client) -> Self {
        Self {
            source: KeySource::Remote {
                url: jwks_url,
                client,
            },
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a manager over a fixed key set.
    pub fn from_local(jwks: JwkSet) -> Self {
        Self {
            source: KeySource::Local(Arc::new(jwks)),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the cache TTL. `Duration::ZERO` disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The remote endpoint, if any.
    pub fn jwks_url(&self) -> Option<&Url> {
        match &self.source {
            KeySource::Remote { url, .. } => Some(url),
            KeySource::Local(_) => None,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Cached key set, if still fresh.
    async fn cached(&self) -> Option<Arc<JwkSet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| Arc::clone(&entry.jwks))
    }

    /// Fetch JWKS (with caching). The flag reports whether the set came from
    /// the cache.
    async fn get_jwks(&self) -> Result<(Arc<JwkSet>, bool), AuthError> {
        if let Some(jwks) = self.cached().await {
            return Ok((jwks, true));
        }

        let jwks = self.fetch_and_store().await?;
        Ok((jwks, false))
    }

    async fn fetch_and_store(&self) -> Result<Arc<JwkSet>, AuthError> {
        let jwks = self.fetch_jwks().await?;

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: Arc::clone(&jwks),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }

    /// Fetch JWKS from the source.
    async fn fetch_jwks(&self) -> Result<Arc<JwkSet>, AuthError> {
        let (url, client) = match &self.source {
            KeySource::Local(jwks) => return Ok(Arc::clone(jwks)),
            KeySource::Remote { url, client } => (url, client),
        };

        let response = client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(jwks_url = %url, error = %e, "JWKS request failed");
            AuthError::JwksUnavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            tracing::warn!(jwks_url = %url, status = %response.status(), "JWKS endpoint returned an error");
            return Err(AuthError::JwksUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::warn!(jwks_url = %url, error = %e, "JWKS response is not a key set");
            AuthError::JwksUnavailable(e.to_string())
        })?;

        tracing::debug!(jwks_url = %url, keys = jwks.keys.len(), "Fetched JWKS");
        Ok(Arc::new(jwks))
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let (jwks, from_cache) = self.get_jwks().await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return jwk_to_decoding_key(jwk);
        }

        if !from_cache {
            return Err(AuthError::UnknownSigningKey);
        }

        tracing::debug!(kid, "Key id not in cached JWKS, refetching");
        let jwks = self.fetch_and_store().await?;
        find_key(&jwks, kid)
            .ok_or(AuthError::UnknownSigningKey)
            .and_then(jwk_to_decoding_key)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.fetch_and_store().await.map(|_| ())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached().await.is_some()
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_jwk(jwk).map_err(|e| {
        tracing::warn!(kid = ?jwk.common.key_id, error = %e, "Unusable key in JWKS");
        AuthError::UnknownSigningKey
    })
}
