//! In-memory host chain for contracts: block time, account creation, ERC-20
//! token ledgers and an event log. Calls are executed all-or-nothing with
//! [`Chain::transact`].

pub mod erc20;

pub use erc20::{Erc20, Ledger, Token};
use {
    alloy::primitives::{Address, B256, Log, U256},
    std::{
        collections::{HashMap, HashSet},
        time::Duration,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("an account already exists at {0}")]
    AccountExists(Address),
    #[error("no token deployed at {0}")]
    UnknownToken(Address),
    #[error("cannot move block time from {current} back to {target}")]
    TimeTravel { current: u64, target: u64 },
    #[error(transparent)]
    Token(#[from] erc20::Error),
}

#[derive(Debug, Clone, Default)]
struct State {
    timestamp: u64,
    accounts: HashSet<Address>,
    nonces: HashMap<Address, u64>,
    tokens: HashMap<Address, Ledger>,
    logs: Vec<Log>,
}

#[derive(Debug, Clone)]
pub struct Chain {
    id: u64,
    state: State,
}

impl Chain {
    /// Creates an empty chain whose block time starts at `timestamp`
    /// (seconds since the unix epoch).
    pub fn new(id: u64, timestamp: u64) -> Self {
        Self {
            id,
            state: State {
                timestamp,
                ..Default::default()
            },
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Timestamp of the current block.
    pub fn timestamp(&self) -> u64 {
        self.state.timestamp
    }

    pub fn advance(&mut self, duration: Duration) {
        self.state.timestamp = self.state.timestamp.saturating_add(duration.as_secs());
    }

    /// Sets the block time. Block time never goes backwards.
    pub fn warp_to(&mut self, timestamp: u64) -> Result<(), Error> {
        if timestamp < self.state.timestamp {
            return Err(Error::TimeTravel {
                current: self.state.timestamp,
                target: timestamp,
            });
        }
        self.state.timestamp = timestamp;
        Ok(())
    }

    /// Registers a new account at the `CREATE` address of `deployer`'s next
    /// nonce.
    pub fn create(&mut self, deployer: Address) -> Result<Address, Error> {
        let nonce = self.state.nonces.entry(deployer).or_default();
        let address = deployer.create(*nonce);
        *nonce += 1;
        self.register(address)
    }

    /// Registers a new account at the `CREATE2` address derived from the
    /// deployer, salt and init code hash. The same inputs can only create an
    /// account once.
    pub fn create2(
        &mut self,
        deployer: Address,
        salt: B256,
        init_code_hash: B256,
    ) -> Result<Address, Error> {
        self.register(deployer.create2(salt.0, init_code_hash.0))
    }

    fn register(&mut self, address: Address) -> Result<Address, Error> {
        if !self.state.accounts.insert(address) {
            return Err(Error::AccountExists(address));
        }
        Ok(address)
    }

    pub fn is_deployed(&self, address: Address) -> bool {
        self.state.accounts.contains(&address)
    }

    /// Deploys a new, empty ERC-20 token.
    pub fn deploy_token(&mut self, deployer: Address) -> Result<Address, Error> {
        let address = self.create(deployer)?;
        self.state.tokens.insert(address, Ledger::default());
        tracing::debug!(?address, "deployed token");
        Ok(address)
    }

    pub fn token(&self, address: Address) -> Result<&Ledger, Error> {
        self.state
            .tokens
            .get(&address)
            .ok_or(Error::UnknownToken(address))
    }

    pub fn token_mut(&mut self, address: Address) -> Result<Token<'_>, Error> {
        let State { tokens, logs, .. } = &mut self.state;
        let ledger = tokens
            .get_mut(&address)
            .ok_or(Error::UnknownToken(address))?;
        Ok(Token {
            address,
            ledger,
            logs,
        })
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), Error> {
        Ok(self.token_mut(token)?.mint(to, amount)?)
    }

    pub fn emit(&mut self, log: Log) {
        self.state.logs.push(log);
    }

    /// All events in the order they were emitted.
    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    /// Events emitted by the contract at `address`.
    pub fn logs_from(&self, address: Address) -> impl Iterator<Item = &Log> + '_ {
        self.state
            .logs
            .iter()
            .filter(move |log| log.address == address)
    }

    /// Runs `call` against the chain. If it fails, every change it made is
    /// reverted.
    pub fn transact<T, E>(&mut self, call: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: std::fmt::Display,
    {
        let snapshot = self.state.clone();
        let result = call(self);
        if let Err(err) = &result {
            tracing::warn!(%err, "reverting transaction");
            self.state = snapshot;
        }
        result
    }
}
