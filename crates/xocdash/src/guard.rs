//! Connection precondition for every contract read.

use alloy::primitives::Address;
use std::sync::Arc;
use xocdash_error::{DashboardError, Result};
use xocdash_provider::{ContractCaller, Session};

/// A session with address, provider and signer all present.
///
/// Only [`check_contract_call_prereqs`] builds one, so holding a
/// `ConnectedSession` is proof the precondition held when it was taken.
#[derive(Debug, Clone)]
pub struct ConnectedSession {
    address: Address,
    provider: Arc<dyn ContractCaller>,
    signer: Arc<dyn ContractCaller>,
}

impl ConnectedSession {
    /// Connected wallet
    pub fn address(&self) -> Address {
        self.address
    }

    /// Read-only handle
    pub fn provider(&self) -> Arc<dyn ContractCaller> {
        self.provider.clone()
    }

    /// Signer-bound handle
    pub fn signer(&self) -> Arc<dyn ContractCaller> {
        self.signer.clone()
    }
}

/// Checks that `session` can make contract calls.
///
/// Reports the first missing part, in the order address, provider, signer.
/// The signer is required for every read, including the ones that only
/// go through the provider; a session with address and provider but no
/// signer is `NotConnected { missing: "signer" }`.
pub fn check_contract_call_prereqs(session: &Session) -> Result<ConnectedSession> {
    let address = session
        .address
        .ok_or(DashboardError::NotConnected { missing: "wallet address" })?;
    let provider = session
        .provider
        .clone()
        .ok_or(DashboardError::NotConnected { missing: "provider" })?;
    let signer = session
        .signer
        .clone()
        .ok_or(DashboardError::NotConnected { missing: "signer" })?;

    Ok(ConnectedSession {
        address,
        provider,
        signer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xocdash_testing::{fixtures, MockCaller};

    #[test]
    fn test_connected_session_passes() {
        let chain = MockCaller::new();
        let session = check_contract_call_prereqs(&fixtures::connected_session(chain)).unwrap();
        assert_eq!(session.address(), fixtures::USER);
    }

    #[test]
    fn test_missing_parts_are_named() {
        let chain = MockCaller::new();
        let full = fixtures::connected_session(chain);

        let err = check_contract_call_prereqs(&Session::disconnected()).unwrap_err();
        assert_eq!(err, DashboardError::NotConnected { missing: "wallet address" });

        let no_provider = Session {
            provider: None,
            ..full.clone()
        };
        let err = check_contract_call_prereqs(&no_provider).unwrap_err();
        assert_eq!(err, DashboardError::NotConnected { missing: "provider" });

        let no_signer = Session { signer: None, ..full };
        let err = check_contract_call_prereqs(&no_signer).unwrap_err();
        assert_eq!(err, DashboardError::NotConnected { missing: "signer" });
    }
}
