//! # In-Memory Bank Ledger
//!
//! A [`BalanceSheet`] is the complete set of denom balances for a single
//! account. A [`BankLedger`] maps accounts to balance sheets and enforces the
//! invariant that you can never spend more than you have.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{insufficient, overflow, Ledger, LedgerError};
use crate::denom::{Amount, Denom};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// BalanceSheet
// ---------------------------------------------------------------------------

/// Denom balances held by one account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    balances: BTreeMap<Denom, Amount>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `denom`, zero if never credited.
    pub fn get(&self, denom: &Denom) -> Amount {
        self.balances.get(denom).copied().unwrap_or_default()
    }

    /// All non-zero balances, ascending by denom.
    pub fn non_zero(&self) -> Vec<(Denom, Amount)> {
        self.balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(denom, amount)| (denom.clone(), *amount))
            .collect()
    }

    fn set(&mut self, denom: &Denom, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(denom);
        } else {
            self.balances.insert(denom.clone(), amount);
        }
    }
}

// ---------------------------------------------------------------------------
// BankLedger
// ---------------------------------------------------------------------------

/// An in-memory [`Ledger`].
#[derive(Clone, Debug, Default)]
pub struct BankLedger {
    accounts: BTreeMap<Address, BalanceSheet>,
}

impl BankLedger {
    /// Creates a ledger with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// The balance sheet of `account`, if it ever held anything.
    pub fn sheet(&self, account: &Address) -> Option<&BalanceSheet> {
        self.accounts.get(account)
    }

    /// Sum of all balances of `denom` across accounts.
    pub fn supply_of(&self, denom: &Denom) -> u128 {
        self.accounts
            .values()
            .map(|sheet| sheet.get(denom).get() as u128)
            .sum()
    }

    fn current(&self, account: &Address, denom: &Denom) -> Amount {
        self.accounts
            .get(account)
            .map(|sheet| sheet.get(denom))
            .unwrap_or_default()
    }

    fn store(&mut self, account: &Address, denom: &Denom, amount: Amount) {
        self.accounts
            .entry(account.clone())
            .or_default()
            .set(denom, amount);
    }
}

impl Ledger for BankLedger {
    fn credit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError> {
        let current = self.current(account, denom);
        let next = current
            .checked_add(amount)
            .ok_or_else(|| overflow(account, denom, current, amount))?;
        self.store(account, denom, next);
        Ok(next)
    }

    fn debit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError> {
        let current = self.current(account, denom);
        let next = current
            .checked_sub(amount)
            .ok_or_else(|| insufficient(account, denom, current, amount))?;
        self.store(account, denom, next);
        Ok(next)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        denom: &Denom,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        // Check both legs before touching either balance.
        let from_balance = self.current(from, denom);
        let from_next = from_balance
            .checked_sub(amount)
            .ok_or_else(|| insufficient(from, denom, from_balance, amount))?;

        if from == to {
            return Ok(());
        }

        let to_balance = self.current(to, denom);
        let to_next = to_balance
            .checked_add(amount)
            .ok_or_else(|| overflow(to, denom, to_balance, amount))?;

        self.store(from, denom, from_next);
        self.store(to, denom, to_next);
        Ok(())
    }

    fn balance(&self, account: &Address, denom: &Denom) -> Result<Amount, LedgerError> {
        Ok(self.current(account, denom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AddressValidator;

    fn addr(seed: u8) -> Address {
        AddressValidator::default().encode(&[seed; 20]).unwrap()
    }

    fn gold() -> Denom {
        Denom::new("gold").unwrap()
    }

    #[test]
    fn credit_then_debit() {
        let mut bank = BankLedger::new();
        let alice = addr(1);

        assert_eq!(bank.credit(&alice, &gold(), Amount::new(100)).unwrap(), Amount::new(100));
        assert_eq!(bank.debit(&alice, &gold(), Amount::new(40)).unwrap(), Amount::new(60));
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::new(60));
    }

    #[test]
    fn debit_more_than_balance_is_rejected_without_change() {
        let mut bank = BankLedger::new();
        let alice = addr(1);
        bank.credit(&alice, &gold(), Amount::new(10)).unwrap();

        let err = bank.debit(&alice, &gold(), Amount::new(11)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::new(10));
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let mut bank = BankLedger::new();
        let alice = addr(1);
        bank.credit(&alice, &gold(), Amount::MAX).unwrap();
        let err = bank.credit(&alice, &gold(), Amount::new(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::MAX);
    }

    #[test]
    fn transfer_conserves_supply() {
        let mut bank = BankLedger::new();
        let (alice, bob) = (addr(1), addr(2));
        bank.credit(&alice, &gold(), Amount::new(100)).unwrap();

        bank.transfer(&alice, &bob, &gold(), Amount::new(30)).unwrap();
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::new(70));
        assert_eq!(bank.balance(&bob, &gold()).unwrap(), Amount::new(30));
        assert_eq!(bank.supply_of(&gold()), 100);
    }

    #[test]
    fn failed_transfer_changes_nothing() {
        let mut bank = BankLedger::new();
        let (alice, bob) = (addr(1), addr(2));
        bank.credit(&alice, &gold(), Amount::new(5)).unwrap();

        assert!(bank.transfer(&alice, &bob, &gold(), Amount::new(6)).is_err());
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::new(5));
        assert_eq!(bank.balance(&bob, &gold()).unwrap(), Amount::ZERO);
        assert!(bank.sheet(&bob).is_none());
    }

    #[test]
    fn self_transfer_is_a_checked_no_op() {
        let mut bank = BankLedger::new();
        let alice = addr(1);
        bank.credit(&alice, &gold(), Amount::new(5)).unwrap();

        bank.transfer(&alice, &alice, &gold(), Amount::new(5)).unwrap();
        assert_eq!(bank.balance(&alice, &gold()).unwrap(), Amount::new(5));
        assert!(bank.transfer(&alice, &alice, &gold(), Amount::new(6)).is_err());
    }

    #[test]
    fn insufficient_funds_message_uses_coin_format() {
        let mut bank = BankLedger::new();
        let err = bank.debit(&addr(1), &gold(), Amount::new(30)).unwrap_err();
        assert!(err.to_string().starts_with("spendable balance 0gold is smaller than 30gold"));
    }
}
