//! Activity source seam and its HTTP implementation.
//!
//! The orchestrator only sees [`ActivitySource`]. [`HttpActivitySource`]
//! talks to a JSON endpoint with connection pooling, rate limiting and
//! retries on transient failures.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use playstats_common::{
    AccountId, CategorizedEntry, RecentEntry, Result, RetrievalKind, StatsError,
};
use playstats_config::SourceConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Where activity collections come from.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Short-window activity of `identifier`.
    async fn recently_played(&self, identifier: &AccountId) -> Result<Vec<RecentEntry>>;

    /// All-time activity of `identifier` with category labels.
    async fn all_activity_with_categories(
        &self,
        identifier: &AccountId,
    ) -> Result<Vec<CategorizedEntry>>;
}

/// HTTP client for the activity endpoints.
#[derive(Clone)]
pub struct HttpActivitySource {
    client: Client,
    base_url: Url,
    max_retries: usize,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for HttpActivitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpActivitySource")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .field("rate_limiter", &"<RateLimiter>")
            .finish_non_exhaustive()
    }
}

impl HttpActivitySource {
    /// Creates a client from the source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| StatsError::network_with_source("Failed to create HTTP client", e))?;

        // Endpoints are joined relative to the base, which needs a trailing slash
        // to keep any path prefix.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| {
            StatsError::config_with_source(format!("Invalid source URL: {}", config.base_url), e)
        })?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| StatsError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            rate_limiter,
        })
    }

    /// Builds the request URL of an endpoint for `identifier`.
    pub fn endpoint_url(&self, kind: RetrievalKind, identifier: &AccountId) -> Result<Url> {
        let mut url = self.base_url.join(kind.endpoint()).map_err(|e| {
            StatsError::config_with_source(format!("Cannot build URL for {kind}"), e)
        })?;
        url.query_pairs_mut()
            .append_pair("identifier", identifier.as_str());
        Ok(url)
    }

    /// Issues one GET with retries on transient failures.
    #[instrument(skip_all, fields(url = %url))]
    async fn send(&self, url: &Url) -> Result<Response> {
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries);

        let attempt = || {
            let request = self.client.get(url.clone());
            let rate_limiter = Arc::clone(&self.rate_limiter);
            async move {
                rate_limiter.until_ready().await;

                match request.send().await {
                    Ok(response) if response.status().is_success() => {
                        debug!("Request successful: {}", response.status());
                        Ok(response)
                    }
                    Ok(response) if response.status().is_client_error() => {
                        error!("Client error: {}", response.status());
                        Err(StatsError::source_with_status(
                            format!("Source returned client error: {}", response.status()),
                            response.status().as_u16(),
                        ))
                    }
                    Ok(response) => {
                        warn!("Server error, will retry: {}", response.status());
                        Err(StatsError::source_with_status(
                            format!("Source returned server error: {}", response.status()),
                            response.status().as_u16(),
                        ))
                    }
                    Err(e) if e.is_timeout() => {
                        warn!("Request timeout, will retry: {}", e);
                        Err(StatsError::network_with_source("Request timeout", e))
                    }
                    Err(e) if e.is_connect() => {
                        warn!("Connection error, will retry: {}", e);
                        Err(StatsError::network_with_source("Connection error", e))
                    }
                    Err(e) => {
                        error!("Request failed: {}", e);
                        Err(StatsError::network_with_source("Request failed", e))
                    }
                }
            }
        };

        RetryIf::spawn(retry_strategy, attempt, StatsError::is_transient).await
    }

    /// Fetches one collection. A `null` body counts as an empty collection.
    async fn fetch_collection<T>(&self, kind: RetrievalKind, identifier: &AccountId) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(kind, identifier)?;
        let response = self.send(&url).await?;

        let text = response
            .text()
            .await
            .map_err(|e| StatsError::network_with_source("Failed to read response body", e))?;
        debug!(bytes = text.len(), %kind, "Received collection body");

        let entries: Option<Vec<T>> = serde_json::from_str(&text)?;
        let entries = entries.unwrap_or_default();
        info!(%kind, entries = entries.len(), "Fetched collection");
        Ok(entries)
    }
}

#[async_trait]
impl ActivitySource for HttpActivitySource {
    #[instrument(skip_all, fields(identifier = %identifier))]
    async fn recently_played(&self, identifier: &AccountId) -> Result<Vec<RecentEntry>> {
        self.fetch_collection(RetrievalKind::Recent, identifier).await
    }

    #[instrument(skip_all, fields(identifier = %identifier))]
    async fn all_activity_with_categories(
        &self,
        identifier: &AccountId,
    ) -> Result<Vec<CategorizedEntry>> {
        self.fetch_collection(RetrievalKind::Full, identifier).await
    }
}

/// In-memory source returning fixed collections, for tests and demos.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct StaticActivitySource {
    /// Answer to `recently_played`; `Err(message)` simulates a failure.
    pub recent: std::result::Result<Vec<RecentEntry>, String>,
    /// Answer to `all_activity_with_categories`; `Err(message)` simulates a failure.
    pub full: std::result::Result<Vec<CategorizedEntry>, String>,
}

#[cfg(any(test, feature = "testing"))]
impl StaticActivitySource {
    /// A source answering both endpoints successfully.
    pub const fn new(recent: Vec<RecentEntry>, full: Vec<CategorizedEntry>) -> Self {
        Self {
            recent: Ok(recent),
            full: Ok(full),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl ActivitySource for StaticActivitySource {
    async fn recently_played(&self, _identifier: &AccountId) -> Result<Vec<RecentEntry>> {
        self.recent.clone().map_err(|message| StatsError::Network { message, source: None })
    }

    async fn all_activity_with_categories(
        &self,
        _identifier: &AccountId,
    ) -> Result<Vec<CategorizedEntry>> {
        self.full.clone().map_err(|message| StatsError::Network { message, source: None })
    }
}
