//! Contract read operations.
//!
//! One [`ReadKind`] per dashboard slot. Every read goes through
//! [`DashboardReader::fetch`], which checks the session, runs the read
//! under the retry policy, and publishes the value into its slot on success.

use crate::config::HealthRatioPolicy;
use crate::guard::{check_contract_call_prereqs, ConnectedSession};
use crate::slots::{DashboardSlots, Slot, SlotName};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use xocdash_contracts::bindings::{AssetsAccountant, HouseOfCoin, HouseOfReserve, MockWETH, XOC};
use xocdash_contracts::{Contract, ContractAddresses, ContractHandle, TokenIds};
use xocdash_error::{DashboardError, Result};
use xocdash_provider::{ContractCaller, PriceFeed, PricePayloadSource, SessionStore};
use xocdash_resilience::{retry_read, RetryPolicy};

/// One dashboard read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadKind {
    /// `MockWETH.allowance(user, HouseOfReserve)`
    WethAllowance,
    /// `MockWETH.balanceOf(user)`
    WethBalance,
    /// `AssetsAccountant.balanceOf(user, reserveTokenId)`
    WethDepositBalance,
    /// `HouseOfReserve.checkMaxWithdrawal(user)`
    WethMaxWithdrawal,
    /// `XOC.allowance(user, HouseOfCoin)`
    XocAllowance,
    /// `XOC.balanceOf(user)`
    XocBalance,
    /// `HouseOfCoin.checkRemainingMintingPower(user, WETH)`
    XocMintingPower,
    /// `AssetsAccountant.balanceOf(user, backedTokenId)`
    XocDebt,
    /// `HouseOfCoin.redstoneGetLastPrice()`
    WethToXocRate,
    /// `HouseOfCoin.computeUserHealthRatio(user, WETH)`
    HealthRatio,
    /// `HouseOfCoin.liqParam().liquidationThreshold`
    LiquidationThreshold,
    /// `HouseOfReserve.collateralRatio()`
    CollateralRatio,
}

impl ReadKind {
    /// Every read
    pub const ALL: [ReadKind; 12] = [
        ReadKind::WethAllowance,
        ReadKind::WethBalance,
        ReadKind::WethDepositBalance,
        ReadKind::WethMaxWithdrawal,
        ReadKind::XocAllowance,
        ReadKind::XocBalance,
        ReadKind::XocMintingPower,
        ReadKind::XocDebt,
        ReadKind::WethToXocRate,
        ReadKind::HealthRatio,
        ReadKind::LiquidationThreshold,
        ReadKind::CollateralRatio,
    ];

    /// Reads a refresh runs strictly one after another, in this order.
    /// The health ratio read consults the deposit and debt slots.
    pub const ORDERED: [ReadKind; 4] = [
        ReadKind::WethBalance,
        ReadKind::WethDepositBalance,
        ReadKind::XocDebt,
        ReadKind::HealthRatio,
    ];

    /// Reads a refresh runs concurrently
    pub const UNORDERED: [ReadKind; 8] = [
        ReadKind::WethAllowance,
        ReadKind::WethMaxWithdrawal,
        ReadKind::XocAllowance,
        ReadKind::XocBalance,
        ReadKind::XocMintingPower,
        ReadKind::WethToXocRate,
        ReadKind::LiquidationThreshold,
        ReadKind::CollateralRatio,
    ];

    /// Slot this read publishes into
    pub fn slot(&self) -> SlotName {
        match self {
            ReadKind::WethAllowance => SlotName::UserWethAllowance,
            ReadKind::WethBalance => SlotName::UserWethBalance,
            ReadKind::WethDepositBalance => SlotName::UserWethDepositBalance,
            ReadKind::WethMaxWithdrawal => SlotName::UserWethMaxWithdrawal,
            ReadKind::XocAllowance => SlotName::UserXocAllowance,
            ReadKind::XocBalance => SlotName::UserXocBalance,
            ReadKind::XocMintingPower => SlotName::UserXocMintingPower,
            ReadKind::XocDebt => SlotName::UserXocDebt,
            ReadKind::WethToXocRate => SlotName::WethToXoc,
            ReadKind::HealthRatio => SlotName::UserHealthRatio,
            ReadKind::LiquidationThreshold => SlotName::LiquidationThreshold,
            ReadKind::CollateralRatio => SlotName::CollateralRatioParam,
        }
    }

    /// Whether the call carries a signed price payload
    pub fn is_price_attested(&self) -> bool {
        matches!(
            self,
            ReadKind::WethMaxWithdrawal
                | ReadKind::XocMintingPower
                | ReadKind::WethToXocRate
                | ReadKind::HealthRatio
        )
    }

    /// `Contract.method` label used in logs and errors
    pub fn label(&self) -> &'static str {
        match self {
            ReadKind::WethAllowance => "MockWETH.allowance",
            ReadKind::WethBalance => "MockWETH.balanceOf",
            ReadKind::WethDepositBalance => "AssetsAccountant.balanceOf(reserve)",
            ReadKind::WethMaxWithdrawal => "HouseOfReserve.checkMaxWithdrawal",
            ReadKind::XocAllowance => "XOC.allowance",
            ReadKind::XocBalance => "XOC.balanceOf",
            ReadKind::XocMintingPower => "HouseOfCoin.checkRemainingMintingPower",
            ReadKind::XocDebt => "AssetsAccountant.balanceOf(backed)",
            ReadKind::WethToXocRate => "HouseOfCoin.redstoneGetLastPrice",
            ReadKind::HealthRatio => "HouseOfCoin.computeUserHealthRatio",
            ReadKind::LiquidationThreshold => "HouseOfCoin.liqParam",
            ReadKind::CollateralRatio => "HouseOfReserve.collateralRatio",
        }
    }
}

impl fmt::Display for ReadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot().as_str())
    }
}

/// Successful result of one read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadOutcome {
    /// The value was written to the read's slot
    Published,
    /// The read's own precondition did not hold; no call was made
    Skipped {
        /// Why the read did not run
        reason: SkipReason,
    },
}

/// Why a read was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Deposit or debt is unknown or zero, so there is no health ratio
    NoOpenPosition,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoOpenPosition => f.write_str("no open position"),
        }
    }
}

/// `numerator / denominator` as a real number
pub fn collateral_ratio(numerator: U256, denominator: U256) -> Result<f64> {
    if denominator.is_zero() {
        return Err(DashboardError::InvalidValue(format!(
            "collateral ratio {numerator}/0 has a zero denominator"
        )));
    }
    Ok(to_f64(numerator)? / to_f64(denominator)?)
}

fn to_f64(value: U256) -> Result<f64> {
    Ok(value.to_string().parse::<f64>()?)
}

/// Reads the XOC protocol contracts for the connected wallet and publishes
/// the results into [`DashboardSlots`].
#[derive(Debug, Clone)]
pub struct DashboardReader {
    sessions: SessionStore,
    addresses: ContractAddresses,
    token_ids: TokenIds,
    price_source: Arc<dyn PricePayloadSource>,
    price_feed: PriceFeed,
    retry: RetryPolicy,
    health_ratio_policy: HealthRatioPolicy,
    slots: Arc<DashboardSlots>,
}

impl DashboardReader {
    /// Creates a reader with default retry, feed and health ratio policy,
    /// publishing into fresh slots
    pub fn new(
        sessions: SessionStore,
        addresses: ContractAddresses,
        token_ids: TokenIds,
        price_source: Arc<dyn PricePayloadSource>,
    ) -> Self {
        Self {
            sessions,
            addresses,
            token_ids,
            price_source,
            price_feed: PriceFeed::default(),
            retry: RetryPolicy::default(),
            health_ratio_policy: HealthRatioPolicy::default(),
            slots: Arc::new(DashboardSlots::new()),
        }
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the price feed used by price-attested reads
    pub fn with_price_feed(mut self, feed: PriceFeed) -> Self {
        self.price_feed = feed;
        self
    }

    /// Set what happens to the health ratio when there is no open position
    pub fn with_health_ratio_policy(mut self, policy: HealthRatioPolicy) -> Self {
        self.health_ratio_policy = policy;
        self
    }

    /// Publish into existing slots
    pub fn with_slots(mut self, slots: Arc<DashboardSlots>) -> Self {
        self.slots = slots;
        self
    }

    /// Slots this reader publishes into
    pub fn slots(&self) -> &Arc<DashboardSlots> {
        &self.slots
    }

    /// Session store this reader takes snapshots from
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one read against the current session
    pub async fn fetch(&self, kind: ReadKind) -> Result<ReadOutcome> {
        let session = check_contract_call_prereqs(&self.sessions.snapshot())?;
        self.fetch_connected(&session, kind).await
    }

    pub(crate) async fn fetch_connected(&self, session: &ConnectedSession, kind: ReadKind) -> Result<ReadOutcome> {
        let result = retry_read(&self.retry, kind.label(), || self.read_once(session, kind)).await;
        match &result {
            Ok(ReadOutcome::Published) => {}
            Ok(ReadOutcome::Skipped { reason }) => debug!(read = %kind, %reason, "read skipped"),
            Err(e) => warn!(read = %kind, error = %e, code = ?e.code(), "read failed"),
        }
        result
    }

    async fn read_once(&self, session: &ConnectedSession, kind: ReadKind) -> Result<ReadOutcome> {
        let user = session.address();
        match kind {
            ReadKind::WethAllowance => {
                let weth = self.handle(Contract::MockWeth, session.provider());
                let call = MockWETH::allowanceCall {
                    owner: user,
                    spender: self.addresses.house_of_reserve,
                };
                publish(&self.slots.user_weth_allowance, weth.read(call).await?)
            }
            ReadKind::WethBalance => {
                let weth = self.handle(Contract::MockWeth, session.provider());
                let balance = weth.read(MockWETH::balanceOfCall { account: user }).await?;
                publish(&self.slots.user_weth_balance, balance)
            }
            ReadKind::WethDepositBalance => {
                let accountant = self.handle(Contract::AssetsAccountant, session.provider());
                let call = AssetsAccountant::balanceOfCall {
                    account: user,
                    id: self.token_ids.reserve,
                };
                publish(&self.slots.user_weth_deposit_balance, accountant.read(call).await?)
            }
            ReadKind::WethMaxWithdrawal => {
                let reserve = self.attested(Contract::HouseOfReserve, session.signer());
                let max = reserve.read(HouseOfReserve::checkMaxWithdrawalCall { user }).await?;
                publish(&self.slots.user_weth_max_withdrawal, max)
            }
            ReadKind::XocAllowance => {
                let xoc = self.handle(Contract::Xoc, session.provider());
                let call = XOC::allowanceCall {
                    owner: user,
                    spender: self.addresses.house_of_coin,
                };
                publish(&self.slots.user_xoc_allowance, xoc.read(call).await?)
            }
            ReadKind::XocBalance => {
                let xoc = self.handle(Contract::Xoc, session.provider());
                let balance = xoc.read(XOC::balanceOfCall { account: user }).await?;
                publish(&self.slots.user_xoc_balance, balance)
            }
            ReadKind::XocMintingPower => {
                let coin = self.attested(Contract::HouseOfCoin, session.signer());
                let call = HouseOfCoin::checkRemainingMintingPowerCall {
                    user,
                    reserveAsset: self.addresses.mock_weth,
                };
                publish(&self.slots.user_xoc_minting_power, coin.read(call).await?)
            }
            ReadKind::XocDebt => {
                let accountant = self.handle(Contract::AssetsAccountant, session.provider());
                let call = AssetsAccountant::balanceOfCall {
                    account: user,
                    id: self.token_ids.backed,
                };
                publish(&self.slots.user_xoc_debt, accountant.read(call).await?)
            }
            ReadKind::WethToXocRate => {
                let coin = self.attested(Contract::HouseOfCoin, session.signer());
                let price = coin.read(HouseOfCoin::redstoneGetLastPriceCall {}).await?;
                publish(&self.slots.weth_to_xoc, price)
            }
            ReadKind::HealthRatio => self.health_ratio(session).await,
            ReadKind::LiquidationThreshold => {
                let coin = self.handle(Contract::HouseOfCoin, session.provider());
                let params = coin.read(HouseOfCoin::liqParamCall {}).await?;
                publish(&self.slots.liquidation_threshold, params.liquidationThreshold)
            }
            ReadKind::CollateralRatio => {
                let reserve = self.handle(Contract::HouseOfReserve, session.provider());
                let ratio = reserve.read(HouseOfReserve::collateralRatioCall {}).await?;
                let value = collateral_ratio(ratio.numerator, ratio.denominator)?;
                publish(&self.slots.collateral_ratio_param, value)
            }
        }
    }

    async fn health_ratio(&self, session: &ConnectedSession) -> Result<ReadOutcome> {
        let deposit = self.slots.user_weth_deposit_balance.get();
        let debt = self.slots.user_xoc_debt.get();
        let open_position = matches!(
            (deposit, debt),
            (Some(deposit), Some(debt)) if !deposit.is_zero() && !debt.is_zero()
        );

        if !open_position {
            if self.health_ratio_policy == HealthRatioPolicy::Clear {
                self.slots.user_health_ratio.clear();
            }
            return Ok(ReadOutcome::Skipped {
                reason: SkipReason::NoOpenPosition,
            });
        }

        let coin = self.attested(Contract::HouseOfCoin, session.signer());
        let call = HouseOfCoin::computeUserHealthRatioCall {
            user: session.address(),
            reserveAsset: self.addresses.mock_weth,
        };
        publish(&self.slots.user_health_ratio, coin.read(call).await?)
    }

    fn handle(&self, contract: Contract, caller: Arc<dyn ContractCaller>) -> ContractHandle {
        ContractHandle::new(contract, &self.addresses, caller)
    }

    fn attested(&self, contract: Contract, signer: Arc<dyn ContractCaller>) -> ContractHandle {
        self.handle(contract, signer)
            .with_price_feed(self.price_source.clone(), self.price_feed.clone())
    }
}

fn publish<T: Clone + fmt::Debug>(slot: &Slot<T>, value: T) -> Result<ReadOutcome> {
    debug!(slot = %slot.name(), ?value, "publish");
    slot.set(value);
    Ok(ReadOutcome::Published)
}
