//! Configuration

use crate::reads::DashboardReader;
use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use xocdash_contracts::{ContractAddresses, TokenIds};
use xocdash_error::{DashboardError, Result};
use xocdash_provider::{
    HttpPricePayloadSource, PriceFeed, PricePayloadSource, ProviderConfig, Session, SessionStore,
    StaticPricePayloadSource,
};
use xocdash_resilience::RetryPolicy;

/// Environment variable overriding [`DashboardConfig::rpc_url`]
pub const ENV_RPC_URL: &str = "XOCDASH_RPC_URL";
/// Environment variable overriding [`DashboardConfig::wallet_address`]
pub const ENV_WALLET: &str = "XOCDASH_WALLET";
/// Environment variable overriding [`PriceFeedConfig::gateway_url`]
pub const ENV_PRICE_GATEWAY: &str = "XOCDASH_PRICE_GATEWAY";

/// What the health ratio slot shows when there is no open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthRatioPolicy {
    /// Keep the last computed value
    #[default]
    LeaveStale,
    /// Empty the slot
    Clear,
}

/// Where price-attested reads get their signed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// HTTP gateway serving `{gateway_url}/{feed}`
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// Fixed hex payload, for local nodes; used when no gateway is set
    #[serde(default)]
    pub static_payload: Option<String>,
    /// Feed namespace
    #[serde(default)]
    pub feed: PriceFeed,
    /// Gateway request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_timeout() -> u64 {
    10
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            static_payload: None,
            feed: PriceFeed::default(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl PriceFeedConfig {
    /// Builds the configured payload source
    pub fn source(&self) -> Result<Arc<dyn PricePayloadSource>> {
        if let Some(gateway) = &self.gateway_url {
            let source = HttpPricePayloadSource::new(gateway, Duration::from_secs(self.timeout_secs))?;
            return Ok(Arc::new(source));
        }
        if let Some(raw) = &self.static_payload {
            let payload = hex::decode(raw.trim_start_matches("0x"))?;
            return Ok(Arc::new(StaticPricePayloadSource::new(Bytes::from(payload))));
        }
        Err(DashboardError::ConfigError(
            "price_feed needs a gateway_url or a static_payload".to_string(),
        ))
    }
}

/// Dashboard configuration, stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Wallet to observe
    #[serde(default)]
    pub wallet_address: Option<Address>,
    /// Deployed protocol contracts
    pub contracts: ContractAddresses,
    /// ERC-1155 ids in the assets accountant
    pub token_ids: TokenIds,
    /// Price payload source
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
    /// Per-read retry
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Health ratio with no open position
    #[serde(default)]
    pub health_ratio_policy: HealthRatioPolicy,
}

impl DashboardConfig {
    /// Default config file name
    pub const DEFAULT_PATH: &'static str = "xocdash.json";

    /// Parses a config document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DashboardError::ConfigError(e.to_string()))
    }

    /// Reads a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Writes the config file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DashboardError::ConfigError(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Applies `XOCDASH_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `XOCDASH_*` names
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(wallet) = lookup(ENV_WALLET) {
            self.wallet_address = Some(parse_address(&wallet)?);
        }
        if let Some(gateway) = lookup(ENV_PRICE_GATEWAY) {
            self.price_feed.gateway_url = Some(gateway);
        }
        Ok(())
    }

    /// Checks URLs, contract addresses and the retry bound
    pub fn validate(&self) -> Result<()> {
        self.provider_config().validate()?;

        if let Some(gateway) = &self.price_feed.gateway_url {
            let url = Url::parse(gateway)
                .map_err(|e| DashboardError::ConfigError(format!("invalid price gateway '{gateway}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(DashboardError::ConfigError(format!(
                    "price gateway must be http or https, got '{}'",
                    url.scheme()
                )));
            }
        } else if self.price_feed.static_payload.is_none() {
            return Err(DashboardError::ConfigError(
                "price_feed needs a gateway_url or a static_payload".to_string(),
            ));
        }

        let unset = self.contracts.unset();
        if !unset.is_empty() {
            let names: Vec<&str> = unset.iter().map(|c| c.name()).collect();
            return Err(DashboardError::ConfigError(format!(
                "contract addresses not set: {}",
                names.join(", ")
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(DashboardError::ConfigError("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.attempt_timeout_ms == 0 {
            return Err(DashboardError::ConfigError("retry.attempt_timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// RPC endpoint configuration
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(self.rpc_url.clone())
    }

    /// Watch-only session for the configured wallet
    pub fn session(&self) -> Result<Session> {
        let wallet = self.wallet_address.ok_or(DashboardError::NotConnected {
            missing: "wallet address",
        })?;
        Session::watch_only(wallet, &self.provider_config())
    }

    /// Reader wired to `sessions` with this configuration's contracts,
    /// price feed, retry and health ratio policy
    pub fn reader(&self, sessions: SessionStore) -> Result<DashboardReader> {
        let reader = DashboardReader::new(
            sessions,
            self.contracts.clone(),
            self.token_ids,
            self.price_feed.source()?,
        )
        .with_price_feed(self.price_feed.feed.clone())
        .with_retry(self.retry.clone())
        .with_health_ratio_policy(self.health_ratio_policy);
        Ok(reader)
    }
}

/// Parses a `0x`-prefixed hex address
pub fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|e| DashboardError::InvalidAddress {
        address: raw.to_string(),
        reason: e.to_string(),
    })
}
