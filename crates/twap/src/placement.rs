use {
    crate::data::PartSignature,
    alloy::{
        primitives::{Address, Bytes, Log},
        sol_types::SolEvent,
    },
    anyhow::{Context as _, Result},
    contracts::ICoWSwapOnchainOrders::OrderPlacement,
    model::{
        DomainSeparator,
        order::{OrderCreation, OrderData, OrderUid},
        signature::Signature,
    },
};

/// An order part announced by an `OrderPlacement` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The order instance that owns and signs the part.
    pub instance: Address,
    pub order: OrderData,
    pub signature: Signature,
    pub meta: Bytes,
}

impl Placement {
    pub fn from_log(log: &Log) -> Result<Self> {
        let event = OrderPlacement::decode_log_data(&log.data)
            .context("log is not an OrderPlacement event")?;
        Ok(Self {
            instance: event.sender,
            order: OrderData::try_from(event.order)?,
            signature: Signature::try_from(event.signature)?,
            meta: event.data,
        })
    }

    pub fn uid(&self, domain: &DomainSeparator) -> OrderUid {
        self.order.uid(domain, &self.instance)
    }

    /// The part and terms encoded in an EIP-1271 signature.
    pub fn part_signature(&self) -> Result<PartSignature> {
        match &self.signature {
            Signature::Eip1271(bytes) => Ok(PartSignature::decode(bytes)?),
            Signature::PreSign => anyhow::bail!("pre-signed placements carry no part"),
        }
    }

    /// The order as it is submitted to the orderbook API.
    pub fn order_creation(&self) -> OrderCreation {
        OrderCreation {
            data: self.order,
            from: Some(self.instance),
            signature: self.signature.clone(),
        }
    }
}
