//! # xocdash Testing Infrastructure
//!
//! Test doubles and fixtures for the read client:
//! - [`MockCaller`]: a [`ContractCaller`] answering exact calls with canned
//!   values or errors and recording every call it receives
//! - [`MockPriceSource`]: a price payload source with a recognizable payload
//! - fixture addresses, token ids and sessions
//! - proptest strategies for on-chain amounts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xocdash_testing::*;
//!
//! let chain = MockCaller::new();
//! chain.respond(fixtures::MOCK_WETH, MockWETH::balanceOfCall { account: fixtures::USER }, U256::from(5));
//! let sessions = fixtures::connected_store(chain.clone());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use xocdash_error::{DashboardError, Result};
use xocdash_provider::{ContractCaller, PriceFeed, PricePayloadSource};

// ============================================================================
// Mock Caller
// ============================================================================

/// A call observed by [`MockCaller`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Method name as reported by the handle
    pub method: String,
    /// Target contract
    pub to: Address,
    /// Full call data, including any appended price payload
    pub input: Bytes,
}

impl RecordedCall {
    /// True when the call carried [`PRICE_PAYLOAD`]
    pub fn is_price_attested(&self) -> bool {
        self.input.ends_with(PRICE_PAYLOAD)
    }

    /// Call data without the price payload
    pub fn calldata(&self) -> &[u8] {
        strip_payload(&self.input)
    }

    /// True when this is a call to `C` on `to`
    pub fn is<C: SolCall>(&self, to: Address) -> bool {
        self.to == to && self.calldata().starts_with(&C::SELECTOR)
    }

    /// Decodes the call arguments
    pub fn decode<C: SolCall>(&self) -> C {
        C::abi_decode(self.calldata()).expect("recorded call does not match the requested signature")
    }
}

fn strip_payload(input: &[u8]) -> &[u8] {
    input.strip_suffix(PRICE_PAYLOAD).unwrap_or(input)
}

#[derive(Debug, Default)]
struct Reply {
    queued: VecDeque<Result<Bytes>>,
    standing: Option<Result<Bytes>>,
}

/// [`ContractCaller`] with canned replies keyed by `(address, calldata)`.
///
/// Queued replies (`*_once`) are used first, then the standing reply.
/// Calls with no reply revert with `"no mock reply"`.
#[derive(Debug, Default)]
pub struct MockCaller {
    replies: Mutex<HashMap<(Address, Vec<u8>), Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCaller {
    /// Creates an empty mock
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_reply<F: FnOnce(&mut Reply)>(&self, to: Address, calldata: Vec<u8>, f: F) {
        let mut replies = self.replies.lock().expect("mock poisoned");
        f(replies.entry((to, calldata)).or_default());
    }

    /// Answers `call` on `to` with `value` from now on
    pub fn respond<C: SolCall, V: SolValue>(&self, to: Address, call: C, value: V) {
        let data = Bytes::from(value.abi_encode());
        self.with_reply(to, call.abi_encode(), |r| r.standing = Some(Ok(data)));
    }

    /// Answers the next `call` on `to` with `value`
    pub fn respond_once<C: SolCall, V: SolValue>(&self, to: Address, call: C, value: V) {
        let data = Bytes::from(value.abi_encode());
        self.with_reply(to, call.abi_encode(), |r| r.queued.push_back(Ok(data)));
    }

    /// Fails `call` on `to` with `error` from now on
    pub fn fail<C: SolCall>(&self, to: Address, call: C, error: DashboardError) {
        self.with_reply(to, call.abi_encode(), |r| r.standing = Some(Err(error)));
    }

    /// Fails the next `call` on `to` with `error`
    pub fn fail_once<C: SolCall>(&self, to: Address, call: C, error: DashboardError) {
        self.with_reply(to, call.abi_encode(), |r| r.queued.push_back(Err(error)));
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock poisoned").clone()
    }

    /// Calls to method `C` on `to`
    pub fn calls_to<C: SolCall>(&self, to: Address) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.is::<C>(to)).collect()
    }

    /// Position of the first call to `C` on `to`
    pub fn position_of<C: SolCall>(&self, to: Address) -> Option<usize> {
        self.calls().iter().position(|c| c.is::<C>(to))
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock poisoned").len()
    }

    /// Forgets recorded calls, keeping replies
    pub fn reset_calls(&self) {
        self.calls.lock().expect("mock poisoned").clear();
    }
}

#[async_trait]
impl ContractCaller for MockCaller {
    async fn call(&self, method: &str, to: Address, input: Bytes) -> Result<Bytes> {
        self.calls.lock().expect("mock poisoned").push(RecordedCall {
            method: method.to_string(),
            to,
            input: input.clone(),
        });

        let key = (to, strip_payload(&input).to_vec());
        let mut replies = self.replies.lock().expect("mock poisoned");
        match replies.get_mut(&key) {
            Some(reply) => match reply.queued.pop_front() {
                Some(next) => next,
                None => reply
                    .standing
                    .clone()
                    .unwrap_or_else(|| Err(DashboardError::revert(method, "no mock reply"))),
            },
            None => Err(DashboardError::revert(method, "no mock reply")),
        }
    }
}

// ============================================================================
// Mock Price Source
// ============================================================================

/// Payload appended by [`MockPriceSource`]. 24 bytes, so it never lines up
/// with an ABI word.
pub const PRICE_PAYLOAD: &[u8] = b"xocdash-test-price-blob!";

/// Price payload source returning [`PRICE_PAYLOAD`], or an error once armed
#[derive(Debug, Default)]
pub struct MockPriceSource {
    failure: Mutex<Option<DashboardError>>,
    requests: Mutex<Vec<PriceFeed>>,
}

impl MockPriceSource {
    /// Creates a working source
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every later request fail with `error`
    pub fn fail_with(&self, error: DashboardError) {
        *self.failure.lock().expect("mock poisoned") = Some(error);
    }

    /// Feeds requested so far
    pub fn requests(&self) -> Vec<PriceFeed> {
        self.requests.lock().expect("mock poisoned").clone()
    }
}

#[async_trait]
impl PricePayloadSource for MockPriceSource {
    async fn signed_payload(&self, feed: &PriceFeed) -> Result<Bytes> {
        self.requests.lock().expect("mock poisoned").push(feed.clone());
        if let Some(err) = self.failure.lock().expect("mock poisoned").clone() {
            return Err(err);
        }
        Ok(Bytes::from_static(PRICE_PAYLOAD))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Fixed addresses and ids shared by tests
pub mod fixtures {
    use super::*;
    use alloy::primitives::address;
    use xocdash_contracts::{ContractAddresses, TokenIds};
    use xocdash_provider::{Session, SessionStore};

    /// Connected wallet
    pub const USER: Address = address!("1111111111111111111111111111111111111111");
    /// Collateral token
    pub const MOCK_WETH: Address = address!("00000000000000000000000000000000000000a1");
    /// Collateral vault
    pub const HOUSE_OF_RESERVE: Address = address!("00000000000000000000000000000000000000a2");
    /// Minting contract
    pub const HOUSE_OF_COIN: Address = address!("00000000000000000000000000000000000000a3");
    /// Deposit/debt ledger
    pub const ASSETS_ACCOUNTANT: Address = address!("00000000000000000000000000000000000000a4");
    /// Stablecoin
    pub const XOC: Address = address!("00000000000000000000000000000000000000a5");

    /// ERC-1155 id of deposited WETH
    pub const RESERVE_TOKEN_ID: U256 = U256::from_limbs([11, 0, 0, 0]);
    /// ERC-1155 id of minted XOC debt
    pub const BACKED_TOKEN_ID: U256 = U256::from_limbs([22, 0, 0, 0]);

    /// The fixture deployment
    pub fn addresses() -> ContractAddresses {
        ContractAddresses {
            mock_weth: MOCK_WETH,
            house_of_reserve: HOUSE_OF_RESERVE,
            house_of_coin: HOUSE_OF_COIN,
            assets_accountant: ASSETS_ACCOUNTANT,
            xoc: XOC,
        }
    }

    /// The fixture token ids
    pub fn token_ids() -> TokenIds {
        TokenIds {
            reserve: RESERVE_TOKEN_ID,
            backed: BACKED_TOKEN_ID,
        }
    }

    /// A session for [`USER`] whose provider and signer both hit `chain`
    pub fn connected_session(chain: Arc<MockCaller>) -> Session {
        Session::connected(USER, chain.clone(), chain)
    }

    /// A store holding [`connected_session`]
    pub fn connected_store(chain: Arc<MockCaller>) -> SessionStore {
        let store = SessionStore::new();
        store.connect(connected_session(chain));
        store
    }
}

// ============================================================================
// Property Testing Strategies
// ============================================================================

/// Any amount that fits in a u128 (covers every realistic balance)
pub fn any_amount() -> impl Strategy<Value = U256> {
    any::<u128>().prop_map(U256::from)
}

/// Strictly positive amounts
pub fn positive_amount() -> impl Strategy<Value = U256> {
    (1u128..=u128::MAX).prop_map(U256::from)
}
