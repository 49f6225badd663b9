use {
    alloy::primitives::{Address, Bytes, U256},
    clap::Parser,
    std::{
        fmt::{self, Display, Formatter},
        time::Duration,
    },
};

/// Places a TWAP order on an in-memory chain and prints the orderbook
/// payloads of its parts.
#[derive(Parser)]
pub struct Arguments {
    #[clap(long, env, default_value = "warn,twap=debug,chain=debug")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: tracing::Level,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub log_json: bool,

    #[clap(long, env, default_value = "5")]
    pub chain_id: u64,

    /// Address of the settlement contract. Defaults to the canonical
    /// deployment.
    #[clap(long, env)]
    pub settlement: Option<Address>,

    /// Address of the vault relayer. Defaults to the canonical deployment.
    #[clap(long, env)]
    pub vault_relayer: Option<Address>,

    /// Account deploying the factory and the sell token.
    #[clap(long, env, default_value = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")]
    pub deployer: Address,

    /// Account placing the order. It gets minted the escrow.
    #[clap(long, env, default_value = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8")]
    pub owner: Address,

    #[clap(long, env, default_value = "0x3430d04e42a722c5ae52c5bffbf1f230c2677600")]
    pub buy_token: Address,

    /// Receiver of the bought tokens. Defaults to the owner.
    #[clap(long, env)]
    pub receiver: Option<Address>,

    #[clap(long, env, default_value = "10")]
    pub parts: u32,

    /// Sell amount of every part, in token atoms.
    #[clap(long, env, default_value = "1000000000000000")]
    pub sell_amount: U256,

    /// Minimum buy amount of every part, in token atoms.
    #[clap(long, env, default_value = "10000000000000000000")]
    pub buy_amount: U256,

    /// Fee amount of every part, in token atoms.
    #[clap(long, env, default_value = "500000000000000")]
    pub fee_amount: U256,

    /// How long the parts are valid after placement, e.g. `11d`. Defaults
    /// to one day past the opening of the last part.
    #[clap(long, env, value_parser = humantime::parse_duration)]
    pub validity: Option<Duration>,

    /// String whose hash is the salt of the order instance address.
    #[clap(long, env, default_value = "salt")]
    pub salt: String,

    /// Opaque bytes attached to every placement event.
    #[clap(long, env, default_value = "0x")]
    pub meta: Bytes,

    /// Days to advance block time by before checking which parts are valid.
    #[clap(long, env, default_value = "1")]
    pub days: u64,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            log_json,
            chain_id,
            settlement,
            vault_relayer,
            deployer,
            owner,
            buy_token,
            receiver,
            parts,
            sell_amount,
            buy_amount,
            fee_amount,
            validity,
            salt,
            meta,
            days,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "log_json: {log_json}")?;
        writeln!(f, "chain_id: {chain_id}")?;
        writeln!(f, "settlement: {settlement:?}")?;
        writeln!(f, "vault_relayer: {vault_relayer:?}")?;
        writeln!(f, "deployer: {deployer}")?;
        writeln!(f, "owner: {owner}")?;
        writeln!(f, "buy_token: {buy_token}")?;
        writeln!(f, "receiver: {receiver:?}")?;
        writeln!(f, "parts: {parts}")?;
        writeln!(f, "sell_amount: {sell_amount}")?;
        writeln!(f, "buy_amount: {buy_amount}")?;
        writeln!(f, "fee_amount: {fee_amount}")?;
        writeln!(
            f,
            "validity: {:?}",
            validity.map(|validity| humantime::format_duration(validity).to_string())
        )?;
        writeln!(f, "salt: {salt}")?;
        writeln!(f, "meta: {meta}")?;
        writeln!(f, "days: {days}")?;
        Ok(())
    }
}
