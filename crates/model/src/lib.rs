//! Contains the order models shared by the TWAP contracts and the relay that
//! forwards their orders to the orderbook.

pub mod order;
pub mod signature;

use {
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol_types::{Eip712Domain, SolValue},
    },
    std::{fmt, str::FromStr, sync::LazyLock},
};

#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub [u8; 32]);

impl FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(const_hex::decode_to_array(s)?))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl From<&Eip712Domain> for DomainSeparator {
    fn from(domain: &Eip712Domain) -> Self {
        Self(domain.separator().0)
    }
}

impl DomainSeparator {
    pub fn new(chain_id: u64, contract_address: Address) -> Self {
        /// The EIP-712 domain name used for computing the domain separator.
        static DOMAIN_NAME: LazyLock<B256> = LazyLock::new(|| keccak256(b"Gnosis Protocol"));

        /// The EIP-712 domain version used for computing the domain separator.
        static DOMAIN_VERSION: LazyLock<B256> = LazyLock::new(|| keccak256(b"v2"));

        /// The EIP-712 domain type used computing the domain separator.
        static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
            keccak256(
                b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
            )
        });

        let abi_encode_string = (
            *DOMAIN_TYPE_HASH,
            *DOMAIN_NAME,
            *DOMAIN_VERSION,
            U256::from(chain_id),
            contract_address,
        )
            .abi_encode();

        DomainSeparator(keccak256(abi_encode_string).0)
    }
}
