use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use std::fmt::Debug;
use xocdash_error::Result;

/// Executes read-only contract calls.
///
/// `method` is only used for error reporting and logging; the selector is
/// already part of `input`.
#[async_trait]
pub trait ContractCaller: Send + Sync + Debug {
    /// Performs an `eth_call` against `to` with ABI-encoded `input`,
    /// returning the raw return data.
    async fn call(&self, method: &str, to: Address, input: Bytes) -> Result<Bytes>;
}
