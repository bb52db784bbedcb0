//! Observable dashboard state.
//!
//! Each figure the dashboard shows lives in its own [`Slot`]. Reads write
//! into slots; views subscribe to them. A slot holds `None` until its first
//! successful read.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Names of the dashboard slots, as the UI knows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotName {
    /// WETH the house of reserve may pull from the user
    #[serde(rename = "userWETHAllowance")]
    UserWethAllowance,
    /// WETH held in the wallet
    #[serde(rename = "userWETHBalance")]
    UserWethBalance,
    /// WETH deposited as collateral
    #[serde(rename = "userWETHDepositBalance")]
    UserWethDepositBalance,
    /// WETH the user may withdraw right now
    #[serde(rename = "userWETHMaxWithdrawal")]
    UserWethMaxWithdrawal,
    /// XOC the house of coin may pull from the user
    #[serde(rename = "userXOCAllowance")]
    UserXocAllowance,
    /// XOC held in the wallet
    #[serde(rename = "userXOCBalance")]
    UserXocBalance,
    /// XOC the user may still mint
    #[serde(rename = "userXOCMintingPower")]
    UserXocMintingPower,
    /// XOC minted against collateral
    #[serde(rename = "userXOCDebt")]
    UserXocDebt,
    /// Oracle price of one WETH in XOC, 8 decimals
    #[serde(rename = "WETHToXOC")]
    WethToXoc,
    /// Collateral value over debt
    #[serde(rename = "userHealthRatio")]
    UserHealthRatio,
    /// Health ratio below which a position is liquidated
    #[serde(rename = "liquidationThreshold")]
    LiquidationThreshold,
    /// Required collateralization as a real number
    #[serde(rename = "collateralRatioParam")]
    CollateralRatioParam,
}

impl SlotName {
    /// Every slot, in display order
    pub const ALL: [SlotName; 12] = [
        SlotName::UserWethAllowance,
        SlotName::UserWethBalance,
        SlotName::UserWethDepositBalance,
        SlotName::UserWethMaxWithdrawal,
        SlotName::UserXocAllowance,
        SlotName::UserXocBalance,
        SlotName::UserXocMintingPower,
        SlotName::UserXocDebt,
        SlotName::WethToXoc,
        SlotName::UserHealthRatio,
        SlotName::LiquidationThreshold,
        SlotName::CollateralRatioParam,
    ];

    /// The UI name
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::UserWethAllowance => "userWETHAllowance",
            SlotName::UserWethBalance => "userWETHBalance",
            SlotName::UserWethDepositBalance => "userWETHDepositBalance",
            SlotName::UserWethMaxWithdrawal => "userWETHMaxWithdrawal",
            SlotName::UserXocAllowance => "userXOCAllowance",
            SlotName::UserXocBalance => "userXOCBalance",
            SlotName::UserXocMintingPower => "userXOCMintingPower",
            SlotName::UserXocDebt => "userXOCDebt",
            SlotName::WethToXoc => "WETHToXOC",
            SlotName::UserHealthRatio => "userHealthRatio",
            SlotName::LiquidationThreshold => "liquidationThreshold",
            SlotName::CollateralRatioParam => "collateralRatioParam",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observable value.
#[derive(Debug)]
pub struct Slot<T> {
    name: SlotName,
    sender: watch::Sender<Option<T>>,
}

impl<T: Clone> Slot<T> {
    /// Creates an empty slot
    pub fn new(name: SlotName) -> Self {
        let (sender, _rx) = watch::channel(None);
        Self { name, sender }
    }

    /// Slot name
    pub fn name(&self) -> SlotName {
        self.name
    }

    /// Current value
    pub fn get(&self) -> Option<T> {
        self.sender.borrow().clone()
    }

    /// True once a value has been written and not cleared
    pub fn is_set(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Replaces the value and notifies subscribers
    pub fn set(&self, value: T) {
        self.sender.send_replace(Some(value));
    }

    /// Empties the slot
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    /// Receiver that yields on every write
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.sender.subscribe()
    }
}

/// All dashboard slots.
#[derive(Debug)]
pub struct DashboardSlots {
    /// `userWETHAllowance`
    pub user_weth_allowance: Slot<U256>,
    /// `userWETHBalance`
    pub user_weth_balance: Slot<U256>,
    /// `userWETHDepositBalance`
    pub user_weth_deposit_balance: Slot<U256>,
    /// `userWETHMaxWithdrawal`
    pub user_weth_max_withdrawal: Slot<U256>,
    /// `userXOCAllowance`
    pub user_xoc_allowance: Slot<U256>,
    /// `userXOCBalance`
    pub user_xoc_balance: Slot<U256>,
    /// `userXOCMintingPower`
    pub user_xoc_minting_power: Slot<U256>,
    /// `userXOCDebt`
    pub user_xoc_debt: Slot<U256>,
    /// `WETHToXOC`
    pub weth_to_xoc: Slot<U256>,
    /// `userHealthRatio`
    pub user_health_ratio: Slot<U256>,
    /// `liquidationThreshold`
    pub liquidation_threshold: Slot<U256>,
    /// `collateralRatioParam`
    pub collateral_ratio_param: Slot<f64>,
}

impl Default for DashboardSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSlots {
    /// All slots empty
    pub fn new() -> Self {
        Self {
            user_weth_allowance: Slot::new(SlotName::UserWethAllowance),
            user_weth_balance: Slot::new(SlotName::UserWethBalance),
            user_weth_deposit_balance: Slot::new(SlotName::UserWethDepositBalance),
            user_weth_max_withdrawal: Slot::new(SlotName::UserWethMaxWithdrawal),
            user_xoc_allowance: Slot::new(SlotName::UserXocAllowance),
            user_xoc_balance: Slot::new(SlotName::UserXocBalance),
            user_xoc_minting_power: Slot::new(SlotName::UserXocMintingPower),
            user_xoc_debt: Slot::new(SlotName::UserXocDebt),
            weth_to_xoc: Slot::new(SlotName::WethToXoc),
            user_health_ratio: Slot::new(SlotName::UserHealthRatio),
            liquidation_threshold: Slot::new(SlotName::LiquidationThreshold),
            collateral_ratio_param: Slot::new(SlotName::CollateralRatioParam),
        }
    }

    /// The integer slot called `name`, or `None` for `collateralRatioParam`
    pub fn amount(&self, name: SlotName) -> Option<&Slot<U256>> {
        let slot = match name {
            SlotName::UserWethAllowance => &self.user_weth_allowance,
            SlotName::UserWethBalance => &self.user_weth_balance,
            SlotName::UserWethDepositBalance => &self.user_weth_deposit_balance,
            SlotName::UserWethMaxWithdrawal => &self.user_weth_max_withdrawal,
            SlotName::UserXocAllowance => &self.user_xoc_allowance,
            SlotName::UserXocBalance => &self.user_xoc_balance,
            SlotName::UserXocMintingPower => &self.user_xoc_minting_power,
            SlotName::UserXocDebt => &self.user_xoc_debt,
            SlotName::WethToXoc => &self.weth_to_xoc,
            SlotName::UserHealthRatio => &self.user_health_ratio,
            SlotName::LiquidationThreshold => &self.liquidation_threshold,
            SlotName::CollateralRatioParam => return None,
        };
        Some(slot)
    }

    /// Names of the slots currently holding a value
    pub fn populated(&self) -> Vec<SlotName> {
        SlotName::ALL
            .into_iter()
            .filter(|name| match self.amount(*name) {
                Some(slot) => slot.is_set(),
                None => self.collateral_ratio_param.is_set(),
            })
            .collect()
    }

    /// Empties every slot
    pub fn clear_all(&self) {
        for name in SlotName::ALL {
            match self.amount(name) {
                Some(slot) => slot.clear(),
                None => self.collateral_ratio_param.clear(),
            }
        }
    }

    /// Point-in-time copy of every slot
    pub fn snapshot(&self) -> DashboardSnapshot {
        let values = SlotName::ALL
            .into_iter()
            .map(|name| {
                let value = match self.amount(name) {
                    Some(slot) => slot.get().map(SlotValue::Amount),
                    None => self.collateral_ratio_param.get().map(SlotValue::Ratio),
                };
                (name, value)
            })
            .collect();
        DashboardSnapshot { values }
    }
}

/// Value held by a slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// Raw on-chain integer; serialized as a decimal string
    Amount(#[serde(with = "decimal")] U256),
    /// Real-valued parameter
    Ratio(f64),
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Amount(v) => write!(f, "{v}"),
            SlotValue::Ratio(v) => write!(f, "{v}"),
        }
    }
}

mod decimal {
    use alloy::primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        U256::from_str_radix(&s, 10).map_err(de::Error::custom)
    }
}

/// Values of every slot at one moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Slot values in display order; `None` for empty slots
    pub values: Vec<(SlotName, Option<SlotValue>)>,
}

impl DashboardSnapshot {
    /// Value of one slot
    pub fn get(&self, name: SlotName) -> Option<SlotValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| *v)
    }

    /// Slots whose value differs from `previous`, with their new values
    pub fn changes_since(&self, previous: &DashboardSnapshot) -> Vec<(SlotName, Option<SlotValue>)> {
        self.values
            .iter()
            .filter(|(name, value)| previous.get(*name) != *value)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_start_empty() {
        let slots = DashboardSlots::new();
        assert!(slots.populated().is_empty());
        assert!(slots.user_xoc_debt.get().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let slots = DashboardSlots::new();
        slots.user_xoc_debt.set(U256::from(10u64));
        slots.collateral_ratio_param.set(1.5);

        assert_eq!(slots.populated(), vec![SlotName::UserXocDebt, SlotName::CollateralRatioParam]);

        slots.clear_all();
        assert!(slots.populated().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let slot = Slot::<U256>::new(SlotName::WethToXoc);
        let mut rx = slot.subscribe();

        slot.set(U256::from(2_000_00000000u64));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(U256::from(2_000_00000000u64)));
    }

    #[test]
    fn test_serde_names_match_ui() {
        for name in SlotName::ALL {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
    }

    #[test]
    fn test_snapshot_serializes_amounts_as_strings() {
        let slots = DashboardSlots::new();
        slots.user_weth_balance.set(U256::from(10).pow(U256::from(30)));
        slots.collateral_ratio_param.set(1.5);

        let json = serde_json::to_value(slots.snapshot()).unwrap();
        let values = json["values"].as_array().unwrap();
        assert_eq!(values[1][0], "userWETHBalance");
        assert_eq!(values[1][1], "1000000000000000000000000000000");
        assert_eq!(values[11][1], 1.5);
        assert!(values[0][1].is_null());
    }

    #[test]
    fn test_changes_since() {
        let slots = DashboardSlots::new();
        let before = slots.snapshot();
        slots.user_xoc_balance.set(U256::from(3u64));
        let after = slots.snapshot();

        let changes = after.changes_since(&before);
        assert_eq!(changes, vec![(SlotName::UserXocBalance, Some(SlotValue::Amount(U256::from(3u64))))]);
        assert!(after.changes_since(&after).is_empty());
    }
}
