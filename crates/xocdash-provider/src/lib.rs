//! # xocdash Provider
//!
//! The boundary between the read client and the chain: the session that a
//! wallet connector publishes, the [`ContractCaller`] seam every contract
//! read goes through, the alloy-backed JSON-RPC implementation of it, and
//! the sources of signed oracle payloads for price-attested calls.
//!
//! ## Example
//!
//! ```ignore
//! use xocdash_provider::{ProviderConfig, Session, SessionStore};
//!
//! let config = ProviderConfig::new("https://rpc.example.org");
//! let store = SessionStore::new();
//! store.connect(Session::watch_only(wallet, &config)?);
//!
//! let session = store.snapshot();
//! assert!(session.is_connected());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod caller;
mod price_feed;
mod rpc;
mod session;

pub use caller::ContractCaller;
pub use price_feed::{HttpPricePayloadSource, PriceFeed, PricePayloadSource, StaticPricePayloadSource};
pub use rpc::{classify_transport_error, ProviderConfig, RpcCaller};
pub use session::{Session, SessionStore, SessionWatcher};

pub use alloy::primitives::{Address, Bytes};
