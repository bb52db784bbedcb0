//! # xocdash
//!
//! Read client for the XOC protocol dashboard: given a connected wallet
//! session, fetch the user's balances, allowances, deposit, debt, minting
//! power, health ratio and protocol parameters from the protocol contracts
//! and publish each into an observable slot.
//!
//! ## Pieces
//!
//! | Module | Role |
//! |--------|------|
//! | [`guard`] | session precondition checked before every read |
//! | [`reads`] | one [`ReadKind`] per slot, run through [`DashboardReader::fetch`] |
//! | [`aggregator`] | [`DashboardReader::refresh`]: every read, ordered where it matters |
//! | [`slots`] | [`DashboardSlots`], one `watch` channel per figure |
//! | [`config`] | JSON configuration with `XOCDASH_*` overrides |
//!
//! ## Example
//!
//! ```ignore
//! use xocdash::prelude::*;
//!
//! let config = DashboardConfig::load(DashboardConfig::DEFAULT_PATH)?;
//! let sessions = SessionStore::new();
//! sessions.connect(config.session()?);
//!
//! let reader = config.reader(sessions)?;
//! let report = reader.refresh().await?;
//! println!("{:?}", reader.slots().user_health_ratio.get());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
pub mod guard;
pub mod reads;
pub mod slots;

pub use aggregator::{ReadReport, ReadSummary, RefreshReport};
pub use config::{DashboardConfig, HealthRatioPolicy, PriceFeedConfig};
pub use guard::{check_contract_call_prereqs, ConnectedSession};
pub use reads::{collateral_ratio, DashboardReader, ReadKind, ReadOutcome, SkipReason};
pub use slots::{DashboardSlots, DashboardSnapshot, Slot, SlotName, SlotValue};

pub use xocdash_contracts as contracts;
pub use xocdash_error as error;
pub use xocdash_provider as provider;
pub use xocdash_resilience as resilience;

/// Exposes commonly used types when embedding the dashboard reader.
pub mod prelude {
    pub use super::aggregator::RefreshReport;
    pub use super::config::{DashboardConfig, HealthRatioPolicy};
    pub use super::reads::{DashboardReader, ReadKind, ReadOutcome};
    pub use super::slots::{DashboardSlots, SlotName};
    pub use xocdash_error::{DashboardError, Result};
    pub use xocdash_provider::{Session, SessionStore};
}
