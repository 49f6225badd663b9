//! Deployment addresses of the GPv2 settlement contracts. The protocol uses
//! deterministic deployments, so the addresses are the same on every
//! supported network.

use alloy::primitives::{Address, address};

pub mod networks {
    pub const MAINNET: u64 = 1;
    pub const GOERLI: u64 = 5;
    pub const GNOSIS: u64 = 100;
    pub const ARBITRUM_ONE: u64 = 42161;
    pub const SEPOLIA: u64 = 11155111;
}

/// Address of the settlement contract.
pub const GPV2_SETTLEMENT: Address = address!("0x9008D19f58AAbD9eD0D60971565AA8510560ab41");

/// Address of the vault relayer, the contract that pulls sell tokens from
/// order owners during settlement.
pub const GPV2_VAULT_RELAYER: Address = address!("0xC92E8bdf79f0507f65a392b0ab4667716BFE0110");

/// Returns `true` if the settlement contract is deployed on the chain.
pub fn is_supported(chain_id: u64) -> bool {
    use networks::*;
    matches!(chain_id, MAINNET | GOERLI | GNOSIS | ARBITRUM_ONE | SEPOLIA)
}
