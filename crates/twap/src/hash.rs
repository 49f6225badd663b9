//! Hashes binding an order instance to its terms and to the orders it signs.

use {
    crate::data::TwapData,
    alloy::{
        primitives::{B256, keccak256},
        sol_types::SolValue,
    },
    contracts::TWAPOrder,
    model::{DomainSeparator, order::OrderData},
};

/// Commitment to the terms of a TWAP order, `keccak256(abi.encode(data))`.
pub fn commitment(data: &TwapData) -> B256 {
    keccak256(TWAPOrder::Data::from(*data).abi_encode())
}

/// EIP-712 signing hash of a settlement order, as computed by the settlement
/// contract.
pub fn order(domain: &DomainSeparator, record: &OrderData) -> B256 {
    record.hash(domain)
}
