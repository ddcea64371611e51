//! Retrieval strategies over the generation store.

use crate::error::{CacheError, CacheResult};
use crate::install::AssetManifest;
use crate::store::{CacheStore, CachedResponse, RequestKey};
use chrono::Utc;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Prefix shared by every generation this app owns. Eviction only ever
/// touches generations carrying this prefix.
pub const GENERATION_PREFIX: &str = "liftlog-";

/// Names of the two current cache generations.
///
/// The build identifier is baked into both names, so a new build gets
/// fresh generations and `retire_stale_generations` can delete the old
/// pair wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Static (install-time) generation name.
    pub static_generation: String,
    /// Dynamic (live-traffic) generation name.
    pub dynamic_generation: String,
    /// Timeout applied to each network fetch.
    pub fetch_timeout: Duration,
}

impl CacheConfig {
    /// Generation names for a given build identifier.
    pub fn for_build(build: &str) -> Self {
        Self {
            static_generation: format!("{GENERATION_PREFIX}static-{build}"),
            dynamic_generation: format!("{GENERATION_PREFIX}dynamic-{build}"),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::for_build(env!("CARGO_PKG_VERSION"))
    }
}

/// Serves requests from the cache or the network, per strategy.
#[derive(Clone)]
pub struct ResourceLoader {
    config: CacheConfig,
    store: CacheStore,
    client: Client,
}

impl ResourceLoader {
    /// Creates a loader over a store.
    pub fn new(config: CacheConfig, store: CacheStore) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .expect("failed to create HTTP client");
        Self {
            config,
            store,
            client,
        }
    }

    /// The loader's configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Looks up a key in the static generation. No side effects.
    pub fn lookup_static(&self, key: &RequestKey) -> CacheResult<Option<CachedResponse>> {
        self.store.lookup(&self.config.static_generation, key)
    }

    /// Looks up a key in the dynamic generation. No side effects.
    pub fn lookup_dynamic(&self, key: &RequestKey) -> CacheResult<Option<CachedResponse>> {
        self.store.lookup(&self.config.dynamic_generation, key)
    }

    /// Inserts or overwrites a key in the dynamic generation.
    pub fn store_dynamic(&self, key: &RequestKey, response: &CachedResponse) -> CacheResult<()> {
        self.store.store(&self.config.dynamic_generation, key, response)
    }

    /// Network-first retrieval, for endpoint reads.
    ///
    /// Any HTTP response counts as reachable, mirrors into the dynamic
    /// generation, and is returned as-is; only a transport failure falls
    /// back to the cached copy. Both missing means `Unreachable`.
    pub async fn fetch_network_first(&self, key: &RequestKey) -> CacheResult<CachedResponse> {
        let method = self.parse_method(key)?;
        match self.client.request(method, &key.url).send().await {
            Ok(response) => match Self::capture(response).await {
                Ok(captured) => {
                    if let Err(e) = self.store_dynamic(key, &captured) {
                        // Mirroring is best effort; the live response still serves.
                        warn!(url = %key.url, "failed to mirror response into dynamic cache: {e}");
                    }
                    Ok(captured)
                }
                Err(e) => {
                    debug!(url = %key.url, "response body lost in transit, trying dynamic cache: {e}");
                    self.dynamic_fallback(key)
                }
            },
            Err(e) => {
                debug!(url = %key.url, "network send failed, trying dynamic cache: {e}");
                self.dynamic_fallback(key)
            }
        }
    }

    /// Cache-first retrieval, for static assets.
    ///
    /// Checks the static then the dynamic generation as one merged read;
    /// a hit returns without any network activity. A miss is fetched
    /// live and returned without being written back.
    pub async fn fetch_cache_first(&self, key: &RequestKey) -> CacheResult<CachedResponse> {
        if let Some(entry) = self.lookup_static(key)? {
            return Ok(entry);
        }
        if let Some(entry) = self.lookup_dynamic(key)? {
            return Ok(entry);
        }

        debug!(url = %key.url, "cache miss, fetching from network");
        let method = self.parse_method(key)?;
        let response = self.client.request(method, &key.url).send().await?;
        Ok(Self::capture(response).await?)
    }

    /// Populates the static generation from an explicit asset list.
    ///
    /// Every asset is fetched before anything is written, and the batch
    /// is committed in one transaction: a failed fetch or write leaves
    /// the static generation exactly as it was.
    pub async fn install_static(&self, manifest: &AssetManifest) -> CacheResult<usize> {
        let mut fetched = Vec::with_capacity(manifest.len());
        for url in manifest.urls() {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| CacheError::Install {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            let captured = Self::capture(response).await.map_err(|e| CacheError::Install {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            fetched.push((RequestKey::get(url), captured));
        }

        let count = self
            .store
            .store_many(&self.config.static_generation, &fetched)?;
        info!(
            count,
            generation = %self.config.static_generation,
            "installed static asset set"
        );
        Ok(count)
    }

    /// Deletes every app-owned generation other than the current pair.
    /// Called when a new build takes over.
    pub fn retire_stale_generations(&self) -> CacheResult<usize> {
        self.store.evict_stale_generations(
            GENERATION_PREFIX,
            &[
                self.config.static_generation.as_str(),
                self.config.dynamic_generation.as_str(),
            ],
        )
    }

    fn dynamic_fallback(&self, key: &RequestKey) -> CacheResult<CachedResponse> {
        match self.lookup_dynamic(key)? {
            Some(entry) => {
                debug!(url = %key.url, "served stale response from dynamic cache");
                Ok(entry)
            }
            None => Err(CacheError::Unreachable {
                method: key.method.clone(),
                url: key.url.clone(),
            }),
        }
    }

    fn parse_method(&self, key: &RequestKey) -> CacheResult<Method> {
        Method::from_bytes(key.method.as_bytes())
            .map_err(|_| CacheError::InvalidMethod(key.method.clone()))
    }

    async fn capture(response: reqwest::Response) -> Result<CachedResponse, reqwest::Error> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?.to_vec();
        Ok(CachedResponse {
            status,
            content_type,
            body,
            stored_at: Utc::now(),
        })
    }
}
