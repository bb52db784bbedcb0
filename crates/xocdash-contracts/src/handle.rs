//! Contract handles and the price-attested call composition.

use crate::registry::{Contract, ContractAddresses};
use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use xocdash_error::{DashboardError, Result};
use xocdash_provider::{ContractCaller, PriceFeed, PricePayloadSource};

/// One deployed contract bound to a caller.
///
/// Handles are cheap and meant to be built per read and dropped after.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    contract: Contract,
    address: Address,
    caller: Arc<dyn ContractCaller>,
    feed: Option<PriceFeed>,
}

impl ContractHandle {
    /// Binds `contract` at its configured address to `caller`
    pub fn new(contract: Contract, addresses: &ContractAddresses, caller: Arc<dyn ContractCaller>) -> Self {
        Self {
            contract,
            address: addresses.address_of(contract),
            caller,
            feed: None,
        }
    }

    /// Composes this handle with a price-attested call step: every call
    /// made through the returned handle carries the latest signed payload
    /// for `feed` after its ABI-encoded arguments.
    pub fn with_price_feed(self, source: Arc<dyn PricePayloadSource>, feed: PriceFeed) -> Self {
        let caller = Arc::new(PriceAttestedCaller {
            inner: self.caller,
            source,
            feed: feed.clone(),
        });
        Self {
            contract: self.contract,
            address: self.address,
            caller,
            feed: Some(feed),
        }
    }

    /// Which contract this handle targets
    pub fn contract(&self) -> Contract {
        self.contract
    }

    /// Deployed address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Price feed attached by [`Self::with_price_feed`], if any
    pub fn price_feed(&self) -> Option<&PriceFeed> {
        self.feed.as_ref()
    }

    /// Invokes one view method and decodes its return value
    pub async fn read<C: SolCall + Send>(&self, call: C) -> Result<C::Return> {
        let method = method_name::<C>();
        let input = Bytes::from(call.abi_encode());

        tracing::debug!(contract = %self.contract, %method, attested = self.feed.is_some(), "contract read");
        let output = self.caller.call(method, self.address, input).await?;

        C::abi_decode_returns(&output)
            .map_err(|e| DashboardError::AbiError(format!("{}.{method}: {e}", self.contract)))
    }
}

/// `balanceOf(address)` -> `balanceOf`
fn method_name<C: SolCall>() -> &'static str {
    let signature = C::SIGNATURE;
    signature.split('(').next().unwrap_or(signature)
}

/// [`ContractCaller`] that appends a signed price payload to call data.
#[derive(Debug)]
pub struct PriceAttestedCaller {
    inner: Arc<dyn ContractCaller>,
    source: Arc<dyn PricePayloadSource>,
    feed: PriceFeed,
}

#[async_trait]
impl ContractCaller for PriceAttestedCaller {
    async fn call(&self, method: &str, to: Address, input: Bytes) -> Result<Bytes> {
        let payload = self.source.signed_payload(&self.feed).await?;

        let mut data = Vec::with_capacity(input.len() + payload.len());
        data.extend_from_slice(&input);
        data.extend_from_slice(&payload);

        self.inner.call(method, to, Bytes::from(data)).await
    }
}
