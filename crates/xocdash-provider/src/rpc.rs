use crate::caller::ContractCaller;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use url::Url;
use xocdash_error::{DashboardError, Result};
use xocdash_resilience::RpcRetryClassifier;

/// Configuration for a JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// RPC URL
    pub url: String,
}

impl ProviderConfig {
    /// Creates a new provider configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Validates the configuration, returning the parsed URL
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| DashboardError::ConfigError(format!("invalid RPC URL '{}': {e}", self.url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DashboardError::ConfigError(format!(
                "unsupported RPC scheme '{other}', expected http or https"
            ))),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("http://localhost:8545")
    }
}

/// [`ContractCaller`] over an alloy HTTP provider.
///
/// A caller built with [`RpcCaller::with_from`] stamps every call with the
/// wallet address as `from`, which is how signer-bound reads are issued
/// without holding a key.
#[derive(Clone)]
pub struct RpcCaller {
    provider: DynProvider,
    from: Option<Address>,
    url: String,
}

impl RpcCaller {
    /// Connects a read-only caller to the configured endpoint
    pub fn connect(config: &ProviderConfig) -> Result<Self> {
        let url = config.validate()?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self {
            provider,
            from: None,
            url: config.url.clone(),
        })
    }

    /// Returns a copy of this caller that sends calls from `address`
    pub fn with_from(&self, address: Address) -> Self {
        Self {
            provider: self.provider.clone(),
            from: Some(address),
            url: self.url.clone(),
        }
    }

    /// The sender stamped on calls, if any
    pub fn from_address(&self) -> Option<Address> {
        self.from
    }
}

impl std::fmt::Debug for RpcCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcCaller")
            .field("url", &self.url)
            .field("from", &self.from)
            .finish()
    }
}

#[async_trait]
impl ContractCaller for RpcCaller {
    async fn call(&self, method: &str, to: Address, input: Bytes) -> Result<Bytes> {
        let mut tx = TransactionRequest::default().to(to).input(input.into());
        if let Some(from) = self.from {
            tx = tx.from(from);
        }

        tracing::trace!(%to, method, "eth_call");
        self.provider
            .call(tx)
            .await
            .map_err(|e| classify_transport_error(method, &e))
    }
}

/// Maps an alloy transport error onto the dashboard taxonomy: JSON-RPC
/// error responses become reverts, rate limits or network failures by
/// code and message; everything below the JSON-RPC layer is a network
/// failure.
pub fn classify_transport_error(method: &str, err: &TransportError) -> DashboardError {
    if let Some(payload) = err.as_error_resp() {
        let code = payload.code;
        let message: &str = payload.message.as_ref();

        if RpcRetryClassifier::is_revert(code, message) {
            return DashboardError::revert(method, message);
        }
        if RpcRetryClassifier::is_rate_limited(code, message) {
            return DashboardError::RateLimited { retry_after_secs: 1 };
        }
        if RpcRetryClassifier::is_code_retryable(code) {
            return DashboardError::network(method, format!("code {code}: {message}"));
        }
        return DashboardError::External {
            message: format!("{method}: rpc error {code}: {message}"),
        };
    }

    if err.is_ser_error() || err.is_deser_error() {
        return DashboardError::AbiError(format!("{method}: {err}"));
    }

    DashboardError::network(method, err)
}
