//! Contract interfaces, via alloy's `sol!` macro.
//!
//! Only the view methods the dashboard reads are declared.

use alloy::sol;

sol! {
    /// Collateral token (WETH on testnets, a mock with the ERC-20 surface)
    contract MockWETH {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    /// XOC stablecoin (ERC-20)
    contract XOC {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    /// ERC-1155 ledger of reserve deposits and minted debt
    contract AssetsAccountant {
        function balanceOf(address account, uint256 id) external view returns (uint256);
    }

    /// Holds collateral deposits
    contract HouseOfReserve {
        function checkMaxWithdrawal(address user) external view returns (uint256);
        function collateralRatio() external view returns (uint256 numerator, uint256 denominator);
    }

    /// Mints XOC against deposited collateral
    contract HouseOfCoin {
        function redstoneGetLastPrice() external view returns (uint256);
        function checkRemainingMintingPower(address user, address reserveAsset) external view returns (uint256);
        function computeUserHealthRatio(address user, address reserveAsset) external view returns (uint256);
        function liqParam() external view returns (
            uint256 marginCallThreshold,
            uint256 liquidationThreshold,
            uint256 liquidationPricePenaltyDiscount,
            uint256 collateralPenalty
        );
    }
}
