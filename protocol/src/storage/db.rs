//! # RegistryDb — Persistent Storage Engine
//!
//! The on-disk home of the registry, built on sled's embedded key-value
//! store. Denom records and ledger balances share one database so a host
//! can flush both with a single call.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                          | Value                   |
//! |------------|------------------------------|-------------------------|
//! | `denoms`   | `denom` (UTF-8)              | `bincode(DenomRecord)`  |
//! | `balances` | `address` `0x00` `denom`     | amount (8B BE)          |
//! | `metadata` | key (UTF-8)                  | value (bytes)           |
//!
//! sled keeps keys in lexicographic order, which for UTF-8 denoms is exactly
//! the ascending order the registry promises for list queries and exports.
//!
//! ## Atomicity
//!
//! `replace_all` writes one `Batch`. Ledger operations run inside a sled
//! transaction on the `balances` tree, so a transfer either moves both legs
//! or neither.

use std::path::Path;

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Batch, Db, IVec, Tree};

use super::store::{RecordStore, StoreError, StoreResult};
use crate::denom::{Amount, Denom, DenomRecord};
use crate::identity::Address;
use crate::ledger::{insufficient, overflow, Ledger, LedgerError};

/// Well-known key in the `metadata` tree for the last applied height.
const META_LAST_HEIGHT: &[u8] = b"last_height";

// ---------------------------------------------------------------------------
// RegistryDb
// ---------------------------------------------------------------------------

/// Persistent storage engine for registry records and balances.
///
/// sled trees are cheap handles onto the same database, so the record store
/// and ledger returned here can be cloned and moved around freely.
#[derive(Debug, Clone)]
pub struct RegistryDb {
    db: Db,
    denoms: Tree,
    balances: Tree,
    metadata: Tree,
}

impl RegistryDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped. Meant for
    /// tests.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let denoms = db.open_tree("denoms")?;
        let balances = db.open_tree("balances")?;
        let metadata = db.open_tree("metadata")?;

        Ok(Self {
            db,
            denoms,
            balances,
            metadata,
        })
    }

    /// A record store over the `denoms` tree.
    pub fn record_store(&self) -> SledRecordStore {
        SledRecordStore {
            tree: self.denoms.clone(),
        }
    }

    /// A ledger over the `balances` tree.
    pub fn ledger(&self) -> SledLedger {
        SledLedger {
            tree: self.balances.clone(),
        }
    }

    /// Height of the last state transition the host applied, if any.
    pub fn last_height(&self) -> StoreResult<Option<u64>> {
        match self.metadata.get(META_LAST_HEIGHT)? {
            Some(bytes) => Ok(Some(decode_u64(META_LAST_HEIGHT, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Records the height of the last applied state transition.
    pub fn set_last_height(&self, height: u64) -> StoreResult<()> {
        self.metadata
            .insert(META_LAST_HEIGHT, height.to_be_bytes().to_vec())?;
        Ok(())
    }

    /// Blocks until every pending write is durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn decode_u64(key: &[u8], bytes: &[u8]) -> StoreResult<u64> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| StoreError::Corrupt {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: format!("expected 8 bytes, got {}", bytes.len()),
    })?;
    Ok(u64::from_be_bytes(raw))
}

// ---------------------------------------------------------------------------
// SledRecordStore
// ---------------------------------------------------------------------------

/// [`RecordStore`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledRecordStore {
    tree: Tree,
}

impl SledRecordStore {
    fn decode(bytes: &IVec) -> StoreResult<DenomRecord> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn encode(record: &DenomRecord) -> StoreResult<Vec<u8>> {
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl RecordStore for SledRecordStore {
    fn get(&self, denom: &Denom) -> StoreResult<Option<DenomRecord>> {
        match self.tree.get(denom.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, record: &DenomRecord) -> StoreResult<()> {
        self.tree
            .insert(record.denom.as_bytes(), Self::encode(record)?)?;
        Ok(())
    }

    fn remove(&mut self, denom: &Denom) -> StoreResult<()> {
        self.tree.remove(denom.as_bytes())?;
        Ok(())
    }

    fn has(&self, denom: &Denom) -> StoreResult<bool> {
        Ok(self.tree.contains_key(denom.as_bytes())?)
    }

    fn range(&self, start_after: Option<&Denom>, limit: usize) -> StoreResult<Vec<DenomRecord>> {
        let iter = match start_after {
            Some(denom) => self.tree.range::<&[u8], _>((
                std::ops::Bound::Excluded(denom.as_bytes()),
                std::ops::Bound::Unbounded,
            )),
            None => self.tree.iter(),
        };

        let mut records = Vec::with_capacity(limit.min(64));
        for entry in iter.take(limit) {
            let (_key, value) = entry?;
            records.push(Self::decode(&value)?);
        }
        Ok(records)
    }

    fn all(&self) -> StoreResult<Vec<DenomRecord>> {
        self.tree
            .iter()
            .map(|entry| {
                let (_key, value) = entry?;
                Self::decode(&value)
            })
            .collect()
    }

    fn replace_all(&mut self, records: &[DenomRecord]) -> StoreResult<()> {
        let mut batch = Batch::default();
        for key in self.tree.iter().keys() {
            batch.remove(key?);
        }
        for record in records {
            batch.insert(record.denom.as_bytes(), Self::encode(record)?);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.tree.len())
    }
}

// ---------------------------------------------------------------------------
// SledLedger
// ---------------------------------------------------------------------------

/// [`Ledger`] over a sled tree. Every operation is one sled transaction.
#[derive(Debug, Clone)]
pub struct SledLedger {
    tree: Tree,
}

type TxResult<T> = Result<T, ConflictableTransactionError<LedgerError>>;

fn balance_key(account: &Address, denom: &Denom) -> Vec<u8> {
    let mut key = Vec::with_capacity(account.as_str().len() + 1 + denom.as_str().len());
    key.extend_from_slice(account.as_str().as_bytes());
    key.push(0x00);
    key.extend_from_slice(denom.as_bytes());
    key
}

fn read_amount(bytes: Option<IVec>) -> Result<Amount, LedgerError> {
    match bytes {
        Some(bytes) => {
            let raw: [u8; 8] = bytes
                .as_ref()
                .try_into()
                .map_err(|_| LedgerError::Store(format!("corrupt balance entry ({} bytes)", bytes.len())))?;
            Ok(Amount::new(u64::from_be_bytes(raw)))
        }
        None => Ok(Amount::ZERO),
    }
}

fn abort<T>(err: LedgerError) -> TxResult<T> {
    Err(ConflictableTransactionError::Abort(err))
}

fn unwrap_tx<T>(result: Result<T, TransactionError<LedgerError>>) -> Result<T, LedgerError> {
    result.map_err(|e| match e {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => LedgerError::Store(e.to_string()),
    })
}

impl Ledger for SledLedger {
    fn credit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError> {
        let key = balance_key(account, denom);
        unwrap_tx(self.tree.transaction(|tx| {
            let current = match read_amount(tx.get(key.as_slice())?) {
                Ok(current) => current,
                Err(e) => return abort(e),
            };
            let Some(next) = current.checked_add(amount) else {
                return abort(overflow(account, denom, current, amount));
            };
            tx.insert(key.as_slice(), next.get().to_be_bytes().to_vec())?;
            Ok(next)
        }))
    }

    fn debit(&mut self, account: &Address, denom: &Denom, amount: Amount) -> Result<Amount, LedgerError> {
        let key = balance_key(account, denom);
        unwrap_tx(self.tree.transaction(|tx| {
            let current = match read_amount(tx.get(key.as_slice())?) {
                Ok(current) => current,
                Err(e) => return abort(e),
            };
            let Some(next) = current.checked_sub(amount) else {
                return abort(insufficient(account, denom, current, amount));
            };
            tx.insert(key.as_slice(), next.get().to_be_bytes().to_vec())?;
            Ok(next)
        }))
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        denom: &Denom,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let from_key = balance_key(from, denom);
        let to_key = balance_key(to, denom);
        unwrap_tx(self.tree.transaction(|tx| {
            let from_balance = match read_amount(tx.get(from_key.as_slice())?) {
                Ok(balance) => balance,
                Err(e) => return abort(e),
            };
            let Some(from_next) = from_balance.checked_sub(amount) else {
                return abort(insufficient(from, denom, from_balance, amount));
            };
            if from_key == to_key {
                return Ok(());
            }

            let to_balance = match read_amount(tx.get(to_key.as_slice())?) {
                Ok(balance) => balance,
                Err(e) => return abort(e),
            };
            let Some(to_next) = to_balance.checked_add(amount) else {
                return abort(overflow(to, denom, to_balance, amount));
            };

            tx.insert(from_key.as_slice(), from_next.get().to_be_bytes().to_vec())?;
            tx.insert(to_key.as_slice(), to_next.get().to_be_bytes().to_vec())?;
            Ok(())
        }))
    }

    fn balance(&self, account: &Address, denom: &Denom) -> Result<Amount, LedgerError> {
        let bytes = self
            .tree
            .get(balance_key(account, denom))
            .map_err(|e| LedgerError::Store(e.to_string()))?;
        read_amount(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AddressValidator;

    fn addr(seed: u8) -> Address {
        AddressValidator::default().encode(&[seed; 20]).unwrap()
    }

    fn denom(name: &str) -> Denom {
        Denom::new(name).unwrap()
    }

    fn record(name: &str, seed: u8) -> DenomRecord {
        DenomRecord::new(denom(name), addr(seed))
    }

    #[test]
    fn open_temporary_database() {
        let db = RegistryDb::open_temporary().expect("should create temp db");
        assert!(db.record_store().is_empty().unwrap());
        assert!(db.last_height().unwrap().is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let db = RegistryDb::open(dir.path()).expect("should open db");
            db.record_store().set(&record("gold", 1)).unwrap();
            db.set_last_height(7).unwrap();
            db.flush().unwrap();
        }

        let db = RegistryDb::open(dir.path()).expect("should reopen db");
        let got = db.record_store().get(&denom("gold")).unwrap();
        assert_eq!(got, Some(record("gold", 1)));
        assert_eq!(db.last_height().unwrap(), Some(7));
    }

    #[test]
    fn record_store_crud() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut store = db.record_store();

        store.set(&record("gold", 1)).unwrap();
        assert!(store.has(&denom("gold")).unwrap());

        store.set(&record("gold", 2)).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(&denom("gold")).unwrap().unwrap().owner, addr(2));

        store.remove(&denom("gold")).unwrap();
        assert!(store.get(&denom("gold")).unwrap().is_none());
    }

    #[test]
    fn range_pages_in_key_order() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut store = db.record_store();
        for name in ["silver", "gold", "copper", "iron"] {
            store.set(&record(name, 1)).unwrap();
        }

        let page: Vec<_> = store.range(None, 3).unwrap().into_iter().map(|r| r.denom.to_string()).collect();
        assert_eq!(page, vec!["copper", "gold", "iron"]);

        let next: Vec<_> = store
            .range(Some(&denom("iron")), 3)
            .unwrap()
            .into_iter()
            .map(|r| r.denom.to_string())
            .collect();
        assert_eq!(next, vec!["silver"]);
    }

    #[test]
    fn replace_all_is_a_full_swap() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut store = db.record_store();
        store.set(&record("gold", 1)).unwrap();
        store.set(&record("iron", 1)).unwrap();

        store.replace_all(&[record("zinc", 3)]).unwrap();
        assert_eq!(store.all().unwrap(), vec![record("zinc", 3)]);
    }

    #[test]
    fn ledger_transfer_moves_both_legs() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut ledger = db.ledger();
        let (a, b) = (addr(1), addr(2));

        ledger.credit(&a, &denom("gold"), Amount::new(50)).unwrap();
        ledger.transfer(&a, &b, &denom("gold"), Amount::new(20)).unwrap();

        assert_eq!(ledger.balance(&a, &denom("gold")).unwrap(), Amount::new(30));
        assert_eq!(ledger.balance(&b, &denom("gold")).unwrap(), Amount::new(20));
    }

    #[test]
    fn ledger_rejected_transfer_leaves_balances() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut ledger = db.ledger();
        let (a, b) = (addr(1), addr(2));
        ledger.credit(&a, &denom("gold"), Amount::new(10)).unwrap();

        let err = ledger
            .transfer(&a, &b, &denom("gold"), Amount::new(11))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance(&a, &denom("gold")).unwrap(), Amount::new(10));
        assert_eq!(ledger.balance(&b, &denom("gold")).unwrap(), Amount::ZERO);
    }

    #[test]
    fn ledger_balances_are_per_denom() {
        let db = RegistryDb::open_temporary().unwrap();
        let mut ledger = db.ledger();
        let a = addr(1);
        ledger.credit(&a, &denom("gold"), Amount::new(5)).unwrap();
        ledger.credit(&a, &denom("iron"), Amount::new(9)).unwrap();

        assert_eq!(ledger.debit(&a, &denom("iron"), Amount::new(4)).unwrap(), Amount::new(5));
        assert_eq!(ledger.balance(&a, &denom("gold")).unwrap(), Amount::new(5));
    }
}
