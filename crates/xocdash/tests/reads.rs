//! Single-read behavior of `DashboardReader::fetch`

mod common;

use alloy::primitives::U256;
use common::*;
use xocdash::contracts::bindings::{HouseOfCoin, HouseOfReserve, XOC};
use xocdash::error::DashboardError;
use xocdash::{HealthRatioPolicy, ReadKind, ReadOutcome, SkipReason, SlotName, SlotValue};
use xocdash_testing::fixtures::*;

#[tokio::test]
async fn test_no_session_fails_every_read_without_calls() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);
    h.sessions.disconnect();

    for kind in ReadKind::ALL {
        let err = h.reader.fetch(kind).await.unwrap_err();
        assert_eq!(err, DashboardError::NotConnected { missing: "wallet address" }, "{kind}");
    }
    assert_eq!(h.chain.call_count(), 0);
    assert!(h.reader.slots().populated().is_empty());
}

#[tokio::test]
async fn test_missing_signer_blocks_unattested_reads_too() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);
    let mut session = connected_session(h.chain.clone());
    session.signer = None;
    h.sessions.connect(session);

    let err = h.reader.fetch(ReadKind::XocBalance).await.unwrap_err();
    assert_eq!(err, DashboardError::NotConnected { missing: "signer" });
    assert_eq!(h.chain.call_count(), 0);
}

#[tokio::test]
async fn test_each_read_publishes_only_its_slot() {
    let expected = [
        (ReadKind::WethAllowance, SlotValue::Amount(U256::from(WETH_ALLOWANCE))),
        (ReadKind::WethBalance, SlotValue::Amount(U256::from(WETH_BALANCE))),
        (ReadKind::WethDepositBalance, SlotValue::Amount(U256::from(5u64))),
        (ReadKind::WethMaxWithdrawal, SlotValue::Amount(U256::from(MAX_WITHDRAWAL))),
        (ReadKind::XocAllowance, SlotValue::Amount(U256::from(XOC_ALLOWANCE))),
        (ReadKind::XocBalance, SlotValue::Amount(U256::from(XOC_BALANCE))),
        (ReadKind::XocMintingPower, SlotValue::Amount(U256::from(MINTING_POWER))),
        (ReadKind::XocDebt, SlotValue::Amount(U256::from(10u64))),
        (ReadKind::WethToXocRate, SlotValue::Amount(U256::from(WETH_TO_XOC))),
        (ReadKind::LiquidationThreshold, SlotValue::Amount(U256::from(LIQUIDATION_THRESHOLD))),
        (ReadKind::CollateralRatio, SlotValue::Ratio(1.5)),
    ];

    for (kind, value) in expected {
        let h = harness();
        stock_chain(&h.chain, 5, 10);

        assert_eq!(h.reader.fetch(kind).await.unwrap(), ReadOutcome::Published, "{kind}");

        let snapshot = h.reader.slots().snapshot();
        assert_eq!(h.reader.slots().populated(), vec![kind.slot()], "{kind}");
        assert_eq!(snapshot.get(kind.slot()), Some(value), "{kind}");
        assert_eq!(h.chain.call_count(), 1, "{kind}");
    }
}

#[tokio::test]
async fn test_price_attested_reads_carry_payload() {
    for kind in ReadKind::ALL {
        let h = harness();
        stock_chain(&h.chain, 5, 10);
        h.reader.slots().user_weth_deposit_balance.set(U256::from(5u64));
        h.reader.slots().user_xoc_debt.set(U256::from(10u64));

        h.reader.fetch(kind).await.unwrap();

        let calls = h.chain.calls();
        assert_eq!(calls.len(), 1, "{kind}");
        assert_eq!(calls[0].is_price_attested(), kind.is_price_attested(), "{kind}");
    }
}

#[tokio::test]
async fn test_price_feed_name_reaches_source() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);

    h.reader.fetch(ReadKind::WethToXocRate).await.unwrap();

    let requests = h.prices.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].as_str(), "redstone-stocks");
}

#[tokio::test]
async fn test_health_ratio_skipped_when_position_unknown() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);

    let outcome = h.reader.fetch(ReadKind::HealthRatio).await.unwrap();

    assert_eq!(
        outcome,
        ReadOutcome::Skipped {
            reason: SkipReason::NoOpenPosition
        }
    );
    assert_eq!(h.chain.call_count(), 0);
    assert!(h.reader.slots().user_health_ratio.get().is_none());
}

#[tokio::test]
async fn test_health_ratio_skipped_on_zero_deposit_or_debt() {
    for (deposit, debt) in [(0u64, 10u64), (5, 0), (0, 0)] {
        let h = harness();
        stock_chain(&h.chain, deposit, debt);
        h.reader.slots().user_weth_deposit_balance.set(U256::from(deposit));
        h.reader.slots().user_xoc_debt.set(U256::from(debt));
        h.reader.slots().user_health_ratio.set(U256::from(42u64));

        let outcome = h.reader.fetch(ReadKind::HealthRatio).await.unwrap();

        assert!(matches!(outcome, ReadOutcome::Skipped { .. }));
        assert_eq!(h.chain.call_count(), 0);
        assert_eq!(h.reader.slots().user_health_ratio.get(), Some(U256::from(42u64)));
    }
}

#[tokio::test]
async fn test_health_ratio_clear_policy() {
    let h = harness();
    let reader = h.reader.clone().with_health_ratio_policy(HealthRatioPolicy::Clear);
    reader.slots().user_weth_deposit_balance.set(U256::ZERO);
    reader.slots().user_xoc_debt.set(U256::from(10u64));
    reader.slots().user_health_ratio.set(U256::from(42u64));

    reader.fetch(ReadKind::HealthRatio).await.unwrap();

    assert!(reader.slots().user_health_ratio.get().is_none());
    assert_eq!(h.chain.call_count(), 0);
}

#[tokio::test]
async fn test_health_ratio_called_once_with_user_and_weth() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);
    h.reader.slots().user_weth_deposit_balance.set(U256::from(5u64));
    h.reader.slots().user_xoc_debt.set(U256::from(10u64));

    let outcome = h.reader.fetch(ReadKind::HealthRatio).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Published);
    let calls = h.chain.calls_to::<HouseOfCoin::computeUserHealthRatioCall>(HOUSE_OF_COIN);
    assert_eq!(calls.len(), 1);
    let args = calls[0].decode::<HouseOfCoin::computeUserHealthRatioCall>();
    assert_eq!(args.user, USER);
    assert_eq!(args.reserveAsset, MOCK_WETH);
    assert!(calls[0].is_price_attested());
    assert_eq!(h.reader.slots().user_health_ratio.get(), Some(U256::from(HEALTH_RATIO)));
}

#[tokio::test]
async fn test_collateral_ratio_zero_denominator_publishes_nothing() {
    let h = harness();
    h.chain.respond(
        HOUSE_OF_RESERVE,
        HouseOfReserve::collateralRatioCall {},
        (U256::from(150u64), U256::ZERO),
    );
    h.reader.slots().collateral_ratio_param.set(1.25);

    let err = h.reader.fetch(ReadKind::CollateralRatio).await.unwrap_err();

    assert!(matches!(err, DashboardError::InvalidValue(_)));
    assert_eq!(h.reader.slots().collateral_ratio_param.get(), Some(1.25));
    assert_eq!(h.chain.call_count(), 1);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);
    let call = XOC::balanceOfCall { account: USER };
    h.chain.fail_once(XOC, call.clone(), DashboardError::network("balanceOf", "connection reset"));
    h.chain.fail_once(XOC, call, DashboardError::NetworkTimeout { seconds: 20 });

    let outcome = h.reader.fetch(ReadKind::XocBalance).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Published);
    assert_eq!(h.chain.calls_to::<XOC::balanceOfCall>(XOC).len(), 3);
    assert_eq!(h.reader.slots().user_xoc_balance.get(), Some(U256::from(XOC_BALANCE)));
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let h = harness();
    let call = XOC::balanceOfCall { account: USER };
    h.chain.fail(XOC, call, DashboardError::network("balanceOf", "connection refused"));

    let err = h.reader.fetch(ReadKind::XocBalance).await.unwrap_err();

    assert!(matches!(err, DashboardError::NetworkFailure { .. }));
    assert_eq!(h.chain.call_count(), fast_retry().max_attempts as usize);
}

#[tokio::test]
async fn test_revert_is_not_retried_and_keeps_slot() {
    let h = harness();
    h.reader.slots().weth_to_xoc.set(U256::from(1u64));
    h.chain.fail(
        HOUSE_OF_COIN,
        HouseOfCoin::redstoneGetLastPriceCall {},
        DashboardError::revert("redstoneGetLastPrice", "execution reverted: stale price"),
    );

    let err = h.reader.fetch(ReadKind::WethToXocRate).await.unwrap_err();

    assert!(matches!(err, DashboardError::ContractRevert { .. }));
    assert_eq!(h.chain.call_count(), 1);
    assert_eq!(h.reader.slots().weth_to_xoc.get(), Some(U256::from(1u64)));
}

#[tokio::test]
async fn test_price_feed_outage_fails_attested_read_without_call() {
    let h = harness();
    stock_chain(&h.chain, 5, 10);
    h.prices.fail_with(DashboardError::PriceFeed {
        feed: "redstone-stocks".into(),
        reason: "gateway returned 503".into(),
    });

    let err = h.reader.fetch(ReadKind::XocMintingPower).await.unwrap_err();

    assert!(matches!(err, DashboardError::PriceFeed { .. }));
    assert_eq!(h.chain.call_count(), 0);
    assert_eq!(h.prices.requests().len(), fast_retry().max_attempts as usize);
    assert!(h.reader.slots().snapshot().get(SlotName::UserXocMintingPower).is_none());
}
