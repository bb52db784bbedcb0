//! Deployment registry: where each protocol contract lives and which
//! ERC-1155 ids the accountant uses.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The protocol contracts the dashboard reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contract {
    /// Collateral token
    MockWeth,
    /// Collateral vault
    HouseOfReserve,
    /// Minting contract
    HouseOfCoin,
    /// ERC-1155 deposit/debt ledger
    AssetsAccountant,
    /// Stablecoin
    Xoc,
}

impl Contract {
    /// Interface name, used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::MockWeth => "MockWETH",
            Self::HouseOfReserve => "HouseOfReserve",
            Self::HouseOfCoin => "HouseOfCoin",
            Self::AssetsAccountant => "AssetsAccountant",
            Self::Xoc => "XOC",
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deployed addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Collateral token
    pub mock_weth: Address,
    /// Collateral vault
    pub house_of_reserve: Address,
    /// Minting contract
    pub house_of_coin: Address,
    /// ERC-1155 ledger
    pub assets_accountant: Address,
    /// Stablecoin
    pub xoc: Address,
}

impl ContractAddresses {
    /// Address of `contract`
    pub fn address_of(&self, contract: Contract) -> Address {
        match contract {
            Contract::MockWeth => self.mock_weth,
            Contract::HouseOfReserve => self.house_of_reserve,
            Contract::HouseOfCoin => self.house_of_coin,
            Contract::AssetsAccountant => self.assets_accountant,
            Contract::Xoc => self.xoc,
        }
    }

    /// Contracts configured at the zero address
    pub fn unset(&self) -> Vec<Contract> {
        [
            Contract::MockWeth,
            Contract::HouseOfReserve,
            Contract::HouseOfCoin,
            Contract::AssetsAccountant,
            Contract::Xoc,
        ]
        .into_iter()
        .filter(|c| self.address_of(*c).is_zero())
        .collect()
    }
}

/// ERC-1155 token ids held by the assets accountant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIds {
    /// Id of the reserve (deposited WETH) token
    pub reserve: U256,
    /// Id of the backed (minted XOC debt) token
    pub backed: U256,
}
