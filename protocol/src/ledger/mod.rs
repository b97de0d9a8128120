//! # Ledger Module
//!
//! The registry never keeps balances. It decides *whether* a mint or a
//! transfer may happen and then hands the actual value movement to a
//! [`Ledger`]. This module defines that seam and ships an in-memory
//! implementation; the sled-backed one lives next to the database in
//! [`crate::storage::db`].
//!
//! ## Contract
//!
//! 1. **All amounts are [`Amount`] in the denom's smallest unit.** No
//!    floating point, no fractions.
//! 2. **Every call is atomic.** A failed `credit`, `debit`, or `transfer`
//!    leaves every balance exactly as it was. `transfer` is debit and credit
//!    together or nothing.
//! 3. **Errors are opaque to the registry.** They are surfaced to the caller
//!    unchanged.

pub mod bank;

use thiserror::Error;

use crate::denom::{Amount, Coin, Denom};
use crate::identity::Address;

pub use bank::{BalanceSheet, BankLedger};

/// Errors raised by a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The account does not hold enough of the denom.
    #[error("spendable balance {available} is smaller than {requested}: insufficient funds (account {account})")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// What the account holds.
        available: Coin,
        /// What was requested.
        requested: Coin,
    },

    /// A credit would push a balance past `u64::MAX`.
    #[error("balance overflow: {account} holds {current}, crediting {credit}")]
    Overflow {
        /// The account being credited.
        account: Address,
        /// Balance before the failed credit.
        current: Coin,
        /// The amount that overflowed.
        credit: Coin,
    },

    /// The backing store failed.
    #[error("ledger storage error: {0}")]
    Store(String),
}

/// Per-account, per-denom balance keeper.
pub trait Ledger {
    /// Adds `amount` of `denom` to `account` and returns the new balance.
    fn credit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError>;

    /// Removes `amount` of `denom` from `account` and returns the new balance.
    fn debit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError>;

    /// Moves `amount` of `denom` from `from` to `to`.
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        denom: &Denom,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Current balance; zero for accounts that never held the denom.
    fn balance(&self, account: &Address, denom: &Denom) -> Result<Amount, LedgerError>;
}

pub(crate) fn insufficient(account: &Address, denom: &Denom, available: Amount, requested: Amount) -> LedgerError {
    LedgerError::InsufficientBalance {
        account: account.clone(),
        available: Coin::new(available, denom.clone()),
        requested: Coin::new(requested, denom.clone()),
    }
}

pub(crate) fn overflow(account: &Address, denom: &Denom, current: Amount, credit: Amount) -> LedgerError {
    LedgerError::Overflow {
        account: account.clone(),
        current: Coin::new(current, denom.clone()),
        credit: Coin::new(credit, denom.clone()),
    }
}
