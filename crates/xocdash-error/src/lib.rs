//! # xocdash Error
//!
//! Unified error types for the xocdash read client. Every crate in the
//! workspace returns [`Result`] so that failures from the session guard,
//! the JSON-RPC transport, the contracts and the price feed can be told
//! apart by the aggregator without string matching.
//!
//! ## Error Categories
//!
//! - Session: [`DashboardError::NotConnected`]
//! - Network: [`DashboardError::NetworkFailure`], [`DashboardError::NetworkTimeout`],
//!   [`DashboardError::RateLimited`]
//! - Contract: [`DashboardError::ContractRevert`], [`DashboardError::AbiError`]
//! - Local: [`DashboardError::InvalidValue`], [`DashboardError::ConfigError`]
//!
//! ## Example
//!
//! ```
//! use xocdash_error::{DashboardError, Result};
//!
//! fn require_wallet(addr: Option<&str>) -> Result<&str> {
//!     addr.ok_or(DashboardError::NotConnected { missing: "wallet address" })
//! }
//!
//! assert!(require_wallet(None).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

/// The main error type for xocdash operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    // ============ Session Errors ============
    /// No wallet, provider or signer is available
    #[error("Not connected: missing {missing}")]
    NotConnected {
        /// Which part of the session was missing
        missing: &'static str,
    },

    /// Invalid address format or checksum
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The invalid address
        address: String,
        /// Reason for invalidity
        reason: String,
    },

    // ============ Network Errors ============
    /// JSON-RPC call failed before reaching the contract
    #[error("Network failure calling {method}: {reason}")]
    NetworkFailure {
        /// Contract method or RPC method name
        method: String,
        /// Error reason
        reason: String,
    },

    /// Network timeout
    #[error("Network timeout after {seconds}s")]
    NetworkTimeout {
        /// Timeout duration
        seconds: u64,
    },

    /// Rate limited by provider
    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay
        retry_after_secs: u64,
    },

    // ============ Contract Errors ============
    /// The contract call reverted
    #[error("Contract reverted in {method}: {reason}")]
    ContractRevert {
        /// Contract method name
        method: String,
        /// Revert reason as reported by the node
        reason: String,
    },

    /// ABI encoding/decoding error
    #[error("ABI error: {0}")]
    AbiError(String),

    // ============ Price Feed Errors ============
    /// Signed price payload could not be obtained
    #[error("Price feed '{feed}' unavailable: {reason}")]
    PriceFeed {
        /// Price feed namespace
        feed: String,
        /// Error reason
        reason: String,
    },

    // ============ Local Errors ============
    /// A fetched value cannot be published
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Hex decode error
    #[error("Hex decode error: {0}")]
    HexError(String),

    /// Invalid format
    #[error("Invalid format: {0}")]
    FormatError(String),

    /// File IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapped error from external source
    #[error("External error: {message}")]
    External {
        /// Error message
        message: String,
    },
}

/// Convenient Result type using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::IoError(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for DashboardError {
    fn from(err: std::num::ParseFloatError) -> Self {
        DashboardError::FormatError(err.to_string())
    }
}

impl From<hex::FromHexError> for DashboardError {
    fn from(err: hex::FromHexError) -> Self {
        DashboardError::HexError(err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// Session not connected
    NotConnected = 1001,
    /// Invalid address
    InvalidAddress = 1002,
    /// Network failure
    NetworkFailure = 4001,
    /// Network timeout
    NetworkTimeout = 4003,
    /// Rate limited
    RateLimited = 4004,
    /// Contract revert
    ContractRevert = 5001,
    /// ABI error
    AbiError = 5002,
    /// Price feed error
    PriceFeed = 5003,
    /// Invalid value
    InvalidValue = 6001,
    /// Configuration error
    ConfigError = 7001,
}

impl DashboardError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            DashboardError::NotConnected { .. } => ErrorCode::NotConnected,
            DashboardError::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            DashboardError::NetworkFailure { .. } => ErrorCode::NetworkFailure,
            DashboardError::NetworkTimeout { .. } => ErrorCode::NetworkTimeout,
            DashboardError::RateLimited { .. } => ErrorCode::RateLimited,
            DashboardError::ContractRevert { .. } => ErrorCode::ContractRevert,
            DashboardError::AbiError(_) => ErrorCode::AbiError,
            DashboardError::PriceFeed { .. } => ErrorCode::PriceFeed,
            DashboardError::InvalidValue(_) => ErrorCode::InvalidValue,
            DashboardError::ConfigError(_) => ErrorCode::ConfigError,
            _ => ErrorCode::Unknown,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Transport and price-feed failures are retryable; reverts and local
    /// errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashboardError::NetworkFailure { .. }
                | DashboardError::NetworkTimeout { .. }
                | DashboardError::RateLimited { .. }
                | DashboardError::PriceFeed { .. }
        )
    }

    /// Delay in seconds the provider asked for, if any
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            DashboardError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Shorthand for a network failure on `method`
    pub fn network(method: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::NetworkFailure {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a revert in `method`
    pub fn revert(method: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::ContractRevert {
            method: method.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::ContractRevert {
            method: "computeUserHealthRatio".to_string(),
            reason: "no debt".to_string(),
        };
        assert!(err.to_string().contains("computeUserHealthRatio"));
        assert!(err.to_string().contains("no debt"));
    }

    #[test]
    fn test_not_connected_display() {
        let err = DashboardError::NotConnected { missing: "signer" };
        assert_eq!(err.to_string(), "Not connected: missing signer");
        assert_eq!(err.code(), ErrorCode::NotConnected);
    }

    #[test]
    fn test_retryable() {
        let timeout = DashboardError::NetworkTimeout { seconds: 30 };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.retry_after(), None);

        let rate_limit = DashboardError::RateLimited { retry_after_secs: 60 };
        assert!(rate_limit.is_retryable());
        assert_eq!(rate_limit.retry_after(), Some(60));

        assert!(DashboardError::network("balanceOf", "connection refused").is_retryable());
        assert!(!DashboardError::revert("balanceOf", "execution reverted").is_retryable());
        assert!(!DashboardError::NotConnected { missing: "provider" }.is_retryable());
        assert_eq!(DashboardError::InvalidValue("x".into()).retry_after(), None);
    }

    #[test]
    fn test_parse_float_conversion() {
        let parsed: std::result::Result<f64, _> = "abc".parse::<f64>();
        let err: DashboardError = parsed.unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::Unknown);
        assert!(matches!(err, DashboardError::FormatError(_)));
    }
}
