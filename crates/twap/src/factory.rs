//! Places TWAP orders: creates an order instance per order, escrows its
//! funds and announces every part to the orderbook.

use {
    crate::{
        data::{PartSignature, TwapData},
        hash,
        instance::{ConstructorArgs, OrderInstance},
        placement::Placement,
        settlement::Settlement,
    },
    alloy::{
        primitives::{Address, B256, Bytes, Log, U256},
        sol_types::SolEvent,
    },
    anyhow::Result,
    chain::{Chain, Erc20 as _},
    contracts::ICoWSwapOnchainOrders::{OnchainSignature, OrderPlacement},
    model::{order::OrderUid, signature::OnchainSigningScheme},
    std::{collections::HashMap, sync::Arc},
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("escrow amount overflows")]
    Overflow,
    #[error(transparent)]
    Chain(#[from] chain::Error),
}

pub struct OrderFactory {
    address: Address,
    settlement: Arc<dyn Settlement>,
    instances: HashMap<Address, OrderInstance>,
}

impl OrderFactory {
    pub fn deploy(
        chain: &mut Chain,
        deployer: Address,
        settlement: Arc<dyn Settlement>,
    ) -> Result<Self, chain::Error> {
        let address = chain.create(deployer)?;
        tracing::info!(?address, settlement = ?settlement.address(), "deployed TWAP order factory");
        Ok(Self {
            address,
            settlement,
            instances: Default::default(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn constructor_args(&self, owner: Address, data: &TwapData) -> ConstructorArgs {
        ConstructorArgs {
            owner,
            sell_token: data.sell_token,
            data_hash: hash::commitment(&data.with_owner(owner)),
            settlement: self.settlement.clone(),
        }
    }

    /// The address at which `place` creates the instance for these
    /// arguments.
    pub fn instance_address(&self, owner: Address, data: &TwapData, salt: B256) -> Address {
        let init_code_hash = self.constructor_args(owner, data).init_code_hash();
        self.address.create2(salt.0, init_code_hash.0)
    }

    /// Places a TWAP order of `parts` parts owned by `sender`. The sender
    /// must have approved the factory to pull the escrow.
    ///
    /// Returns the uids of the parts in part order. Nothing changes if the
    /// placement fails.
    pub fn place(
        &mut self,
        chain: &mut Chain,
        sender: Address,
        parts: u32,
        data: TwapData,
        meta: Bytes,
        salt: B256,
    ) -> Result<Vec<OrderUid>, PlaceError> {
        let data = data.with_owner(sender);
        let (instance, uids) =
            chain.transact(|chain| self.create_instance(chain, sender, parts, &data, &meta, salt))?;

        tracing::info!(
            instance = ?instance.address(),
            owner = ?sender,
            parts,
            "placed TWAP order"
        );
        self.instances.insert(instance.address(), instance);
        Ok(uids)
    }

    fn create_instance(
        &self,
        chain: &mut Chain,
        sender: Address,
        parts: u32,
        data: &TwapData,
        meta: &Bytes,
        salt: B256,
    ) -> Result<(OrderInstance, Vec<OrderUid>), PlaceError> {
        let args = self.constructor_args(sender, data);
        let address = chain.create2(self.address, salt, args.init_code_hash())?;
        let instance = OrderInstance::new(chain, address, args)?;

        let escrow = data.escrow(parts).ok_or(PlaceError::Overflow)?;
        chain
            .token_mut(data.sell_token)?
            .transfer_from(self.address, sender, address, escrow)
            .map_err(chain::Error::from)?;

        let domain = self.settlement.domain_separator();
        let mut uids = Vec::new();
        for part in 0..parts {
            let part = U256::from(part);
            let order = data.order(part, sender);
            let uid = order.uid(&domain, &address);
            tracing::debug!(%uid, %part, "placing order part");

            let signature = PartSignature { part, data: *data };
            let event = OrderPlacement {
                sender: address,
                order: order.into(),
                signature: OnchainSignature {
                    scheme: OnchainSigningScheme::Eip1271.into(),
                    data: signature.encode().into(),
                },
                data: meta.clone(),
            };
            chain.emit(Log {
                address: self.address,
                data: event.encode_log_data(),
            });
            uids.push(uid);
        }

        Ok((instance, uids))
    }

    pub fn instance(&self, address: Address) -> Option<&OrderInstance> {
        self.instances.get(&address)
    }

    pub fn instance_mut(&mut self, address: Address) -> Option<&mut OrderInstance> {
        self.instances.get_mut(&address)
    }

    pub fn instances(&self) -> impl Iterator<Item = &OrderInstance> {
        self.instances.values()
    }

    /// Every part placed by this factory, in placement order.
    pub fn placements(&self, chain: &Chain) -> Result<Vec<Placement>> {
        chain
            .logs_from(self.address)
            .filter(|log| log.topics().first() == Some(&OrderPlacement::SIGNATURE_HASH))
            .map(Placement::from_log)
            .collect()
    }
}
