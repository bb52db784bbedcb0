//! xocdash contracts
//!
//! Typed access to the XOC protocol contracts. [`ContractHandle`] binds an
//! interface from [`bindings`] to a deployed address and a
//! [`ContractCaller`](xocdash_provider::ContractCaller); handles that need
//! an oracle price are composed with
//! [`ContractHandle::with_price_feed`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod handle;
pub mod registry;

pub use handle::{ContractHandle, PriceAttestedCaller};
pub use registry::{Contract, ContractAddresses, TokenIds};

/// Exposes commonly used types when working with the protocol contracts.
pub mod prelude {
    pub use super::bindings::{AssetsAccountant, HouseOfCoin, HouseOfReserve, MockWETH, XOC};
    pub use super::handle::ContractHandle;
    pub use super::registry::{Contract, ContractAddresses, TokenIds};
}
