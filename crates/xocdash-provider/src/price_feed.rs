//! Signed oracle payloads for price-attested calls.
//!
//! Contracts that need an off-chain price read it from trailing call data:
//! the caller appends a signed payload for a price-feed namespace after the
//! ABI-encoded arguments. This module only fetches those payloads; the
//! composition with a contract handle lives in `xocdash-contracts`.

use alloy::primitives::Bytes;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use xocdash_error::{DashboardError, Result};

/// A price-feed namespace, e.g. `redstone-stocks`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceFeed(String);

impl PriceFeed {
    /// Feed carrying the MXN/USD and WETH prices used by the House contracts
    pub const REDSTONE_STOCKS: &'static str = "redstone-stocks";

    /// Creates a feed name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The feed name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PriceFeed {
    fn default() -> Self {
        Self::new(Self::REDSTONE_STOCKS)
    }
}

impl fmt::Display for PriceFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of signed price payloads
#[async_trait]
pub trait PricePayloadSource: Send + Sync + fmt::Debug {
    /// Latest signed payload for `feed`, ready to append to call data
    async fn signed_payload(&self, feed: &PriceFeed) -> Result<Bytes>;
}

#[derive(Debug, Deserialize)]
struct PayloadResponse {
    payload: String,
}

/// Fetches payloads from an HTTP gateway at `{gateway}/{feed}`.
///
/// The gateway answers with `{ "payload": "0x…" }`.
#[derive(Debug, Clone)]
pub struct HttpPricePayloadSource {
    client: Client,
    gateway: Url,
}

impl HttpPricePayloadSource {
    /// Creates a source for `gateway` with the given request timeout
    pub fn new(gateway: &str, timeout: Duration) -> Result<Self> {
        let mut gateway = Url::parse(gateway)
            .map_err(|e| DashboardError::ConfigError(format!("invalid price gateway '{gateway}': {e}")))?;
        if !gateway.path().ends_with('/') {
            let path = format!("{}/", gateway.path());
            gateway.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xocdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::ConfigError(e.to_string()))?;

        Ok(Self { client, gateway })
    }

    fn feed_url(&self, feed: &PriceFeed) -> Result<Url> {
        self.gateway
            .join(feed.as_str())
            .map_err(|e| DashboardError::PriceFeed {
                feed: feed.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PricePayloadSource for HttpPricePayloadSource {
    async fn signed_payload(&self, feed: &PriceFeed) -> Result<Bytes> {
        let url = self.feed_url(feed)?;
        let feed_err = |reason: String| DashboardError::PriceFeed {
            feed: feed.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| feed_err(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(DashboardError::RateLimited { retry_after_secs });
            }
            status if !status.is_success() => return Err(feed_err(format!("gateway returned {status}"))),
            _ => {}
        }

        let body: PayloadResponse = response.json().await.map_err(|e| feed_err(e.to_string()))?;
        let raw = body.payload.trim_start_matches("0x");
        let bytes = hex::decode(raw)?;
        if bytes.is_empty() {
            return Err(feed_err("empty payload".to_string()));
        }

        tracing::trace!(%feed, len = bytes.len(), "fetched signed price payload");
        Ok(Bytes::from(bytes))
    }
}

/// Fixed payload, for local nodes with a mocked oracle
#[derive(Debug, Clone)]
pub struct StaticPricePayloadSource {
    payload: Bytes,
}

impl StaticPricePayloadSource {
    /// Always returns `payload`
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl PricePayloadSource for StaticPricePayloadSource {
    async fn signed_payload(&self, _feed: &PriceFeed) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}
