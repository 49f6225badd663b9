//! Time-weighted average price orders for the settlement contract. A TWAP
//! order escrows its funds once in an order instance, which then authorizes
//! one equally sized part per elapsed day with EIP-1271 signatures.

pub mod arguments;
pub mod data;
pub mod factory;
pub mod hash;
pub mod instance;
pub mod placement;
pub mod settlement;

pub use {data::TwapData, factory::OrderFactory, instance::OrderInstance};
use {
    alloy::primitives::{Address, U256, keccak256},
    anyhow::{Context as _, Result},
    arguments::Arguments,
    chain::{Chain, Erc20 as _},
    contracts::deployments,
    instance::ONE_DAY,
    model::order::{OrderCreation, OrderUid},
    placement::Placement,
    settlement::GPv2Settlement,
    std::{sync::Arc, time::Duration},
};

/// Outcome of placing an order on a fresh chain.
#[derive(Debug)]
pub struct Simulation {
    pub instance: Address,
    pub uids: Vec<OrderUid>,
    /// The orderbook payloads of the parts, in part order.
    pub payloads: Vec<OrderCreation>,
    /// Parts whose signature is accepted once the simulated days passed.
    pub valid_parts: Vec<usize>,
}

/// Deploys the factory and a sell token, funds the owner, places the order
/// and checks which parts are valid after `args.days` days.
pub fn run(args: &Arguments) -> Result<Simulation> {
    if args.settlement.is_none() && !deployments::is_supported(args.chain_id) {
        tracing::warn!(
            chain_id = args.chain_id,
            "settlement contract is not deployed on this chain, using the mainnet address"
        );
    }
    let now = u64::try_from(chrono::Utc::now().timestamp()).context("system time before epoch")?;
    let mut chain = Chain::new(args.chain_id, now);
    let settlement = Arc::new(GPv2Settlement::for_chain(
        chain.id(),
        args.settlement.unwrap_or(deployments::GPV2_SETTLEMENT),
        args.vault_relayer.unwrap_or(deployments::GPV2_VAULT_RELAYER),
    ));
    let mut factory = OrderFactory::deploy(&mut chain, args.deployer, settlement)?;
    let sell_token = chain.deploy_token(args.deployer)?;

    let validity = args
        .validity
        .unwrap_or(Duration::from_secs((u64::from(args.parts) + 1) * ONE_DAY));
    let valid_to = u32::try_from(now.saturating_add(validity.as_secs()))
        .context("validity ends after the last representable timestamp")?;
    let data = TwapData {
        sell_token,
        buy_token: args.buy_token,
        receiver: args.receiver,
        sell_amount: args.sell_amount,
        buy_amount: args.buy_amount,
        valid_to,
        fee_amount: args.fee_amount,
    };
    let escrow = data.escrow(args.parts).context("escrow amount overflows")?;
    chain.mint(sell_token, args.owner, escrow)?;
    chain
        .token_mut(sell_token)?
        .approve(args.owner, factory.address(), U256::MAX);

    let salt = keccak256(args.salt.as_bytes());
    let address = factory.instance_address(args.owner, &data, salt);
    let uids = factory.place(
        &mut chain,
        args.owner,
        args.parts,
        data,
        args.meta.clone(),
        salt,
    )?;
    let placements = factory.placements(&chain)?;

    chain.advance(Duration::from_secs(args.days.saturating_mul(ONE_DAY)));
    let instance = factory
        .instance(address)
        .context("placed instance is not registered")?;
    let mut valid_parts = Vec::new();
    for (part, (uid, placement)) in uids.iter().zip(&placements).enumerate() {
        let (order_hash, _, _) = uid.parts();
        match instance.is_valid_signature(&chain, order_hash, &placement.signature.to_bytes()) {
            Ok(_) => {
                tracing::info!(part, %uid, "part is valid");
                valid_parts.push(part);
            }
            Err(err) => tracing::info!(part, %uid, %err, "part is not valid"),
        }
    }

    Ok(Simulation {
        instance: address,
        uids,
        payloads: placements.iter().map(Placement::order_creation).collect(),
        valid_parts,
    })
}

pub fn main(args: Arguments) -> Result<()> {
    let simulation = run(&args)?;
    for payload in &simulation.payloads {
        println!("{}", serde_json::to_string(payload)?);
    }
    tracing::info!(
        instance = ?simulation.instance,
        parts = simulation.uids.len(),
        valid_parts = ?simulation.valid_parts,
        "simulated TWAP order"
    );
    Ok(())
}
