//! A single TWAP order. The instance holds the escrowed sell tokens and
//! authorizes one part per elapsed day through EIP-1271 signature checks.

use {
    crate::{
        data::PartSignature,
        hash,
        settlement::Settlement,
    },
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol_types::SolValue,
    },
    chain::{Chain, Erc20 as _},
    contracts::ERC1271_MAGIC_VALUE,
    model::DomainSeparator,
    std::{fmt, sync::Arc},
};

/// Time between two consecutive parts becoming valid, in seconds.
pub const ONE_DAY: u64 = 60 * 60 * 24;

/// Commitment of a cancelled instance. It has no known preimage, so no
/// signature matches it.
pub const CANCELLED: B256 = B256::with_last_byte(1);

/// Stand-in for the creation code of an instance. Together with the
/// constructor arguments it determines the instance address.
const CREATION_CODE: &[u8] = b"TWAPOrderInstance";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Active,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed signature")]
    Malformed,
    #[error("invalid data")]
    InvalidData,
    #[error("invalid order")]
    InvalidOrder,
    #[error("too soon")]
    TooSoon,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    #[error("not the owner")]
    NotOwner,
    #[error(transparent)]
    Chain(#[from] chain::Error),
}

/// Arguments an instance is created with.
#[derive(Clone)]
pub struct ConstructorArgs {
    pub owner: Address,
    pub sell_token: Address,
    pub data_hash: B256,
    pub settlement: Arc<dyn Settlement>,
}

impl ConstructorArgs {
    /// Hash of the creation code followed by the ABI encoded arguments, as
    /// used for `CREATE2` address derivation.
    pub fn init_code_hash(&self) -> B256 {
        let mut init_code = CREATION_CODE.to_vec();
        init_code.extend(
            (
                self.owner,
                self.sell_token,
                self.data_hash,
                self.settlement.address(),
            )
                .abi_encode(),
        );
        keccak256(init_code)
    }
}

pub struct OrderInstance {
    address: Address,
    owner: Address,
    sell_token: Address,
    data_hash: B256,
    start_time: u64,
    settlement: Arc<dyn Settlement>,
}

impl OrderInstance {
    /// Sets up the instance at `address` and lets the settlement's vault
    /// relayer pull any amount of its sell token.
    pub fn new(
        chain: &mut Chain,
        address: Address,
        args: ConstructorArgs,
    ) -> Result<Self, chain::Error> {
        let vault_relayer = args.settlement.vault_relayer();
        chain
            .token_mut(args.sell_token)?
            .approve(address, vault_relayer, U256::MAX);

        let instance = Self {
            address,
            owner: args.owner,
            sell_token: args.sell_token,
            data_hash: args.data_hash,
            start_time: chain.timestamp(),
            settlement: args.settlement,
        };
        tracing::debug!(?instance, ?vault_relayer, "created order instance");
        Ok(instance)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn sell_token(&self) -> Address {
        self.sell_token
    }

    pub fn data_hash(&self) -> B256 {
        self.data_hash
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn domain_separator(&self) -> DomainSeparator {
        self.settlement.domain_separator()
    }

    pub fn state(&self) -> State {
        if self.data_hash == CANCELLED {
            State::Cancelled
        } else {
            State::Active
        }
    }

    /// Block timestamp from which a part's signature is accepted.
    pub fn part_opens_at(&self, part: u32) -> u64 {
        self.start_time
            .saturating_add(u64::from(part).saturating_mul(ONE_DAY))
    }

    /// EIP-1271 signature check. Accepts `order_hash` if `signature` encodes
    /// a part of this instance's order that hashes to it and whose day has
    /// come.
    pub fn is_valid_signature(
        &self,
        chain: &Chain,
        order_hash: B256,
        signature: &[u8],
    ) -> Result<[u8; 4], ValidationError> {
        let PartSignature { part, data } = PartSignature::decode(signature).map_err(|err| {
            tracing::trace!(?err, instance = ?self.address, "undecodable signature");
            ValidationError::Malformed
        })?;
        if hash::commitment(&data) != self.data_hash {
            return Err(ValidationError::InvalidData);
        }

        let record = data.order(part, self.owner);
        if hash::order(&self.domain_separator(), &record) != order_hash {
            return Err(ValidationError::InvalidOrder);
        }

        let elapsed_days = chain.timestamp().saturating_sub(self.start_time) / ONE_DAY;
        if U256::from(elapsed_days) < part {
            return Err(ValidationError::TooSoon);
        }

        Ok(ERC1271_MAGIC_VALUE)
    }

    /// Returns the whole sell token balance to the owner and stops accepting
    /// signatures. Returns the refunded amount.
    pub fn cancel(&mut self, chain: &mut Chain, sender: Address) -> Result<U256, CancelError> {
        if sender != self.owner {
            return Err(CancelError::NotOwner);
        }

        let refund = chain.transact(|chain| {
            let mut token = chain.token_mut(self.sell_token)?;
            let balance = token.balance_of(self.address);
            token
                .transfer(self.address, self.owner, balance)
                .map_err(chain::Error::from)?;
            Ok::<_, chain::Error>(balance)
        })?;
        self.data_hash = CANCELLED;

        tracing::info!(
            instance = ?self.address,
            owner = ?self.owner,
            %refund,
            "cancelled TWAP order"
        );
        Ok(refund)
    }
}

impl fmt::Debug for OrderInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderInstance")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("sell_token", &self.sell_token)
            .field("data_hash", &self.data_hash)
            .field("start_time", &self.start_time)
            .field("settlement", &self.settlement.address())
            .finish()
    }
}
