//! Shared setup for reader tests

#![allow(dead_code)]

use alloy::primitives::U256;
use std::sync::Arc;
use std::time::Duration;
use xocdash::contracts::bindings::{AssetsAccountant, HouseOfCoin, HouseOfReserve, MockWETH, XOC};
use xocdash::provider::SessionStore;
use xocdash::resilience::RetryPolicy;
use xocdash::DashboardReader;
use xocdash_testing::fixtures::*;
use xocdash_testing::{MockCaller, MockPriceSource};

pub const WETH_ALLOWANCE: u64 = 1;
pub const WETH_BALANCE: u64 = 2;
pub const MAX_WITHDRAWAL: u64 = 4;
pub const XOC_ALLOWANCE: u64 = 5;
pub const XOC_BALANCE: u64 = 6;
pub const MINTING_POWER: u64 = 7;
pub const WETH_TO_XOC: u64 = 2_150_000_000_000;
pub const HEALTH_RATIO: u64 = 1_800_000_000_000_000_000;
pub const LIQUIDATION_THRESHOLD: u64 = 1_150_000_000_000_000_000;

pub struct Harness {
    pub chain: Arc<MockCaller>,
    pub prices: Arc<MockPriceSource>,
    pub sessions: SessionStore,
    pub reader: DashboardReader,
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(3)
        .with_initial_delay(Duration::from_millis(1))
        .with_attempt_timeout(Duration::from_secs(5))
}

/// Reader over a connected session with no chain replies configured
pub fn harness() -> Harness {
    let chain = MockCaller::new();
    let prices = MockPriceSource::new();
    let sessions = connected_store(chain.clone());
    let reader = DashboardReader::new(sessions.clone(), addresses(), token_ids(), prices.clone())
        .with_retry(fast_retry());
    Harness {
        chain,
        prices,
        sessions,
        reader,
    }
}

pub fn deposit_call() -> AssetsAccountant::balanceOfCall {
    AssetsAccountant::balanceOfCall {
        account: USER,
        id: RESERVE_TOKEN_ID,
    }
}

pub fn debt_call() -> AssetsAccountant::balanceOfCall {
    AssetsAccountant::balanceOfCall {
        account: USER,
        id: BACKED_TOKEN_ID,
    }
}

pub fn health_call() -> HouseOfCoin::computeUserHealthRatioCall {
    HouseOfCoin::computeUserHealthRatioCall {
        user: USER,
        reserveAsset: MOCK_WETH,
    }
}

/// Answers every dashboard read; deposit and debt are parameters so the
/// health ratio guard can be steered
pub fn stock_chain(chain: &MockCaller, deposit: u64, debt: u64) {
    chain.respond(
        MOCK_WETH,
        MockWETH::allowanceCall {
            owner: USER,
            spender: HOUSE_OF_RESERVE,
        },
        U256::from(WETH_ALLOWANCE),
    );
    chain.respond(MOCK_WETH, MockWETH::balanceOfCall { account: USER }, U256::from(WETH_BALANCE));
    chain.respond(ASSETS_ACCOUNTANT, deposit_call(), U256::from(deposit));
    chain.respond(
        HOUSE_OF_RESERVE,
        HouseOfReserve::checkMaxWithdrawalCall { user: USER },
        U256::from(MAX_WITHDRAWAL),
    );
    chain.respond(
        XOC,
        XOC::allowanceCall {
            owner: USER,
            spender: HOUSE_OF_COIN,
        },
        U256::from(XOC_ALLOWANCE),
    );
    chain.respond(XOC, XOC::balanceOfCall { account: USER }, U256::from(XOC_BALANCE));
    chain.respond(
        HOUSE_OF_COIN,
        HouseOfCoin::checkRemainingMintingPowerCall {
            user: USER,
            reserveAsset: MOCK_WETH,
        },
        U256::from(MINTING_POWER),
    );
    chain.respond(ASSETS_ACCOUNTANT, debt_call(), U256::from(debt));
    chain.respond(HOUSE_OF_COIN, HouseOfCoin::redstoneGetLastPriceCall {}, U256::from(WETH_TO_XOC));
    chain.respond(HOUSE_OF_COIN, health_call(), U256::from(HEALTH_RATIO));
    chain.respond(
        HOUSE_OF_COIN,
        HouseOfCoin::liqParamCall {},
        (
            U256::from(1_200_000_000_000_000_000u64),
            U256::from(LIQUIDATION_THRESHOLD),
            U256::from(950_000_000_000_000_000u64),
            U256::from(50_000_000_000_000_000u64),
        ),
    );
    chain.respond(
        HOUSE_OF_RESERVE,
        HouseOfReserve::collateralRatioCall {},
        (U256::from(150u64), U256::from(100u64)),
    );
}
