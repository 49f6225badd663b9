//! The well known development accounts of a local test node.

use alloy::primitives::{Address, address};

pub const ACCOUNT_0: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const ACCOUNT_1: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const ACCOUNT_2: Address = address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

/// Deploys contracts in tests.
pub const DEPLOYER: Address = ACCOUNT_0;
/// Places orders in tests.
pub const TRADER: Address = ACCOUNT_1;
/// An account that owns nothing in tests.
pub const STRANGER: Address = ACCOUNT_2;
