use crate::caller::ContractCaller;
use crate::rpc::{ProviderConfig, RpcCaller};
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::watch;
use xocdash_error::Result;

/// Wallet session as published by the wallet connector.
///
/// Any part may be missing; the read client never creates or mutates a
/// session, it only takes snapshots.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Connected wallet address
    pub address: Option<Address>,
    /// Read-only handle
    pub provider: Option<Arc<dyn ContractCaller>>,
    /// Signer-bound handle, used for price-attested calls
    pub signer: Option<Arc<dyn ContractCaller>>,
}

impl Session {
    /// A session with nothing connected
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A fully connected session
    pub fn connected(
        address: Address,
        provider: Arc<dyn ContractCaller>,
        signer: Arc<dyn ContractCaller>,
    ) -> Self {
        Self {
            address: Some(address),
            provider: Some(provider),
            signer: Some(signer),
        }
    }

    /// Builds a session that observes `address` over JSON-RPC without a
    /// private key: the signer handle is the same endpoint with `from` set.
    pub fn watch_only(address: Address, config: &ProviderConfig) -> Result<Self> {
        let provider = RpcCaller::connect(config)?;
        let signer = provider.with_from(address);
        Ok(Self::connected(address, Arc::new(provider), Arc::new(signer)))
    }

    /// True when address, provider and signer are all present
    pub fn is_connected(&self) -> bool {
        self.address.is_some() && self.provider.is_some() && self.signer.is_some()
    }
}

/// Receiver that yields on every session change.
pub type SessionWatcher = watch::Receiver<Session>;

/// Shared store the wallet connector writes sessions into.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Creates a store holding a disconnected session
    pub fn new() -> Self {
        let (sender, _rx) = watch::channel(Session::disconnected());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replaces the current session
    pub fn connect(&self, session: Session) {
        tracing::info!(address = ?session.address, "session updated");
        self.sender.send_replace(session);
    }

    /// Drops the current session
    pub fn disconnect(&self) {
        tracing::info!("session disconnected");
        self.sender.send_replace(Session::disconnected());
    }

    /// Current session
    pub fn snapshot(&self) -> Session {
        self.sender.borrow().clone()
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> SessionWatcher {
        self.sender.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NullCaller;

    #[async_trait]
    impl ContractCaller for NullCaller {
        async fn call(&self, _method: &str, _to: Address, _input: Bytes) -> Result<Bytes> {
            Ok(Bytes::new())
        }
    }

    const USER: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn test_default_session_is_disconnected() {
        let store = SessionStore::new();
        assert!(!store.snapshot().is_connected());
    }

    #[test]
    fn test_partial_session_is_not_connected() {
        let session = Session {
            address: Some(USER),
            provider: Some(Arc::new(NullCaller)),
            signer: None,
        };
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_notifies_subscribers() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.connect(Session::connected(USER, Arc::new(NullCaller), Arc::new(NullCaller)));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().address, Some(USER));
        assert!(store.snapshot().is_connected());

        store.disconnect();
        assert!(store.snapshot().address.is_none());
    }

    #[tokio::test]
    async fn test_watch_only_session() {
        let session = Session::watch_only(USER, &ProviderConfig::default()).unwrap();
        assert!(session.is_connected());
        assert!(format!("{:?}", session.signer).contains("from: Some"));
    }
}
