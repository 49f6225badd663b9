//! ERC-20 token ledgers hosted by the [`Chain`](crate::Chain).

use {
    alloy::{
        primitives::{Address, Log, U256},
        sol_types::SolEvent,
    },
    contracts::IERC20,
    std::collections::HashMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("ERC20: transfer amount exceeds balance")]
    InsufficientBalance,
    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance,
    #[error("ERC20: total supply overflow")]
    SupplyOverflow,
}

/// The subset of the ERC-20 interface that accounts interact with. Every
/// mutating call takes the account that sends it.
pub trait Erc20 {
    fn address(&self) -> Address;
    fn balance_of(&self, owner: Address) -> U256;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn approve(&mut self, owner: Address, spender: Address, amount: U256);
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Error>;
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error>;
}

/// Balances and allowances of a single token.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl Ledger {
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Error> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }
        self.balances.insert(from, from_balance - amount);
        // Cannot overflow, balances sum up to the total supply.
        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }
}

/// Mutable handle on a token ledger that records the token's events.
pub struct Token<'a> {
    pub(crate) address: Address,
    pub(crate) ledger: &'a mut Ledger,
    pub(crate) logs: &'a mut Vec<Log>,
}

impl Token<'_> {
    /// Creates `amount` new tokens for `to`. Fails if the total supply would
    /// overflow.
    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), Error> {
        let total_supply = self
            .ledger
            .total_supply
            .checked_add(amount)
            .ok_or(Error::SupplyOverflow)?;
        self.ledger.total_supply = total_supply;
        let balance = self.ledger.balance_of(to);
        self.ledger.balances.insert(to, balance + amount);
        self.emit(IERC20::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
        Ok(())
    }

    fn emit(&mut self, event: impl SolEvent) {
        self.logs.push(Log {
            address: self.address,
            data: event.encode_log_data(),
        });
    }
}

impl Erc20 for Token<'_> {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, owner: Address) -> U256 {
        self.ledger.balance_of(owner)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        tracing::trace!(token = ?self.address, ?owner, ?spender, %amount, "approve");
        self.ledger.allowances.insert((owner, spender), amount);
        self.emit(IERC20::Approval {
            owner,
            spender,
            value: amount,
        });
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Error> {
        tracing::trace!(token = ?self.address, ?from, ?to, %amount, "transfer");
        self.ledger.move_balance(from, to, amount)?;
        self.emit(IERC20::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        tracing::trace!(token = ?self.address, ?spender, ?from, ?to, %amount, "transfer from");
        let allowance = self.ledger.allowance(from, spender);
        // Unlimited allowances are never decreased.
        let unlimited = allowance == U256::MAX;
        if !unlimited && allowance < amount {
            return Err(Error::InsufficientAllowance);
        }
        self.ledger.move_balance(from, to, amount)?;
        if !unlimited {
            self.ledger
                .allowances
                .insert((from, spender), allowance - amount);
        }
        self.emit(IERC20::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, testlib::accounts::*};

    fn token<'a>(ledger: &'a mut Ledger, logs: &'a mut Vec<Log>) -> Token<'a> {
        Token {
            address: Address::repeat_byte(0xee),
            ledger,
            logs,
        }
    }

    #[test]
    fn transfer_moves_balance() {
        let (mut ledger, mut logs) = Default::default();
        let mut token = token(&mut ledger, &mut logs);
        token.mint(TRADER, U256::from(100)).unwrap();

        token.transfer(TRADER, STRANGER, U256::from(40)).unwrap();
        assert_eq!(token.balance_of(TRADER), U256::from(60));
        assert_eq!(token.balance_of(STRANGER), U256::from(40));

        assert_eq!(
            token.transfer(TRADER, STRANGER, U256::from(61)),
            Err(Error::InsufficientBalance)
        );
        assert_eq!(token.balance_of(TRADER), U256::from(60));
        assert_eq!(ledger.total_supply(), U256::from(100));
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let (mut ledger, mut logs) = Default::default();
        let mut token = token(&mut ledger, &mut logs);
        token.mint(TRADER, U256::from(100)).unwrap();
        token.approve(TRADER, DEPLOYER, U256::from(50));

        token
            .transfer_from(DEPLOYER, TRADER, STRANGER, U256::from(30))
            .unwrap();
        assert_eq!(token.allowance(TRADER, DEPLOYER), U256::from(20));
        assert_eq!(
            token.transfer_from(DEPLOYER, TRADER, STRANGER, U256::from(21)),
            Err(Error::InsufficientAllowance)
        );
        assert_eq!(token.balance_of(STRANGER), U256::from(30));
    }

    #[test]
    fn failed_transfer_from_keeps_allowance() {
        let (mut ledger, mut logs) = Default::default();
        let mut token = token(&mut ledger, &mut logs);
        token.mint(TRADER, U256::from(10)).unwrap();
        token.approve(TRADER, DEPLOYER, U256::from(50));

        assert_eq!(
            token.transfer_from(DEPLOYER, TRADER, STRANGER, U256::from(11)),
            Err(Error::InsufficientBalance)
        );
        assert_eq!(token.allowance(TRADER, DEPLOYER), U256::from(50));
    }

    #[test]
    fn unlimited_allowance_is_not_decreased() {
        let (mut ledger, mut logs) = Default::default();
        let mut token = token(&mut ledger, &mut logs);
        token.mint(TRADER, U256::from(100)).unwrap();
        token.approve(TRADER, DEPLOYER, U256::MAX);

        token
            .transfer_from(DEPLOYER, TRADER, STRANGER, U256::from(100))
            .unwrap();
        assert_eq!(token.allowance(TRADER, DEPLOYER), U256::MAX);
    }

    #[test]
    fn emits_transfer_and_approval_events() {
        let (mut ledger, mut logs) = Default::default();
        let mut token = token(&mut ledger, &mut logs);
        token.mint(TRADER, U256::from(5)).unwrap();
        token.approve(TRADER, DEPLOYER, U256::from(5));
        token.transfer(TRADER, STRANGER, U256::from(5)).unwrap();

        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|log| log.address == Address::repeat_byte(0xee)));
        let mint = IERC20::Transfer::decode_log_data(&logs[0].data).unwrap();
        assert_eq!(mint.from, Address::ZERO);
        assert_eq!(mint.to, TRADER);
        let approval = IERC20::Approval::decode_log_data(&logs[1].data).unwrap();
        assert_eq!(approval.spender, DEPLOYER);
        let transfer = IERC20::Transfer::decode_log_data(&logs[2].data).unwrap();
        assert_eq!(transfer.value, U256::from(5));
    }
}
