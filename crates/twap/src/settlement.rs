//! The settlement contract as seen by TWAP orders.

use {
    alloy::primitives::Address,
    contracts::deployments,
    model::DomainSeparator,
};

/// Settlement contract that TWAP order parts are settled by.
#[cfg_attr(test, mockall::automock)]
pub trait Settlement: Send + Sync {
    fn address(&self) -> Address;

    /// Domain separator that orders are signed for.
    fn domain_separator(&self) -> DomainSeparator;

    /// Contract that pulls sell tokens from order owners.
    fn vault_relayer(&self) -> Address;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GPv2Settlement {
    address: Address,
    domain_separator: DomainSeparator,
    vault_relayer: Address,
}

impl GPv2Settlement {
    pub fn new(
        address: Address,
        domain_separator: DomainSeparator,
        vault_relayer: Address,
    ) -> Self {
        Self {
            address,
            domain_separator,
            vault_relayer,
        }
    }

    /// A settlement contract on the given chain, signing orders for the GPv2
    /// domain.
    pub fn for_chain(chain_id: u64, address: Address, vault_relayer: Address) -> Self {
        Self::new(
            address,
            DomainSeparator::new(chain_id, address),
            vault_relayer,
        )
    }

    /// The canonical deployment, if the chain has one.
    pub fn deployed(chain_id: u64) -> Option<Self> {
        deployments::is_supported(chain_id).then(|| {
            Self::for_chain(
                chain_id,
                deployments::GPV2_SETTLEMENT,
                deployments::GPV2_VAULT_RELAYER,
            )
        })
    }
}

impl Settlement for GPv2Settlement {
    fn address(&self) -> Address {
        self.address
    }

    fn domain_separator(&self) -> DomainSeparator {
        self.domain_separator
    }

    fn vault_relayer(&self) -> Address {
        self.vault_relayer
    }
}
