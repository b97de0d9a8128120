//! Conformance tests for the storage and ledger backends.
//!
//! Every check runs against both the in-memory implementation and the sled
//! one, so the registry sees identical behavior whichever it is given.

use mintgate_protocol::{
    Address, AddressValidator, Amount, BankLedger, Denom, DenomRecord, Ledger, LedgerError,
    MemoryStore, RecordStore, RegistryDb,
};

fn addr(seed: u8) -> Address {
    AddressValidator::default().encode(&[seed; 20]).unwrap()
}

fn denom(name: &str) -> Denom {
    Denom::new(name).unwrap()
}

fn record(name: &str, seed: u8) -> DenomRecord {
    DenomRecord::new(denom(name), addr(seed))
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

fn check_record_lifecycle<S: RecordStore>(mut store: S) {
    assert!(store.is_empty().unwrap());
    store.set(&record("gold", 1)).unwrap();
    store.set(&record("gold", 2)).unwrap();

    assert_eq!(store.get(&denom("gold")).unwrap(), Some(record("gold", 2)));
    assert!(store.has(&denom("gold")).unwrap());
    assert_eq!(store.len().unwrap(), 1);

    store.remove(&denom("gold")).unwrap();
    assert_eq!(store.get(&denom("gold")).unwrap(), None);
    // Removing a missing key is not an error.
    store.remove(&denom("gold")).unwrap();
}

fn check_range<S: RecordStore>(mut store: S) {
    for name in ["tin", "gold", "iron", "copper", "silver"] {
        store.set(&record(name, 1)).unwrap();
    }

    let names = |records: Vec<DenomRecord>| -> Vec<String> {
        records.into_iter().map(|r| r.denom.to_string()).collect()
    };

    assert_eq!(names(store.range(None, 2).unwrap()), vec!["copper", "gold"]);
    assert_eq!(
        names(store.range(Some(&denom("gold")), 2).unwrap()),
        vec!["iron", "silver"]
    );
    // A cursor that is not itself stored still works.
    assert_eq!(
        names(store.range(Some(&denom("hematite")), 10).unwrap()),
        vec!["iron", "silver", "tin"]
    );
    assert!(store.range(Some(&denom("tin")), 10).unwrap().is_empty());
    assert_eq!(store.all().unwrap().len(), 5);
}

fn check_replace_all<S: RecordStore>(mut store: S) {
    store.set(&record("copper", 1)).unwrap();
    store.set(&record("gold", 1)).unwrap();

    store
        .replace_all(&[record("gold", 3), record("zinc", 4)])
        .unwrap();

    assert_eq!(store.all().unwrap(), vec![record("gold", 3), record("zinc", 4)]);
}

#[test]
fn memory_store_conforms() {
    check_record_lifecycle(MemoryStore::new());
    check_range(MemoryStore::new());
    check_replace_all(MemoryStore::new());
}

#[test]
fn sled_store_conforms() {
    check_record_lifecycle(RegistryDb::open_temporary().unwrap().record_store());
    check_range(RegistryDb::open_temporary().unwrap().record_store());
    check_replace_all(RegistryDb::open_temporary().unwrap().record_store());
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

fn check_credit_debit<L: Ledger>(mut ledger: L) {
    let gold = denom("gold");
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::ZERO);

    assert_eq!(ledger.credit(&addr(1), &gold, Amount::new(70)).unwrap(), Amount::new(70));
    assert_eq!(ledger.credit(&addr(1), &gold, Amount::new(30)).unwrap(), Amount::new(100));
    assert_eq!(ledger.debit(&addr(1), &gold, Amount::new(40)).unwrap(), Amount::new(60));

    let err = ledger.debit(&addr(1), &gold, Amount::new(61)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::new(60));

    let err = ledger.credit(&addr(1), &gold, Amount::MAX).unwrap_err();
    assert!(matches!(err, LedgerError::Overflow { .. }));
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::new(60));
}

fn check_transfer<L: Ledger>(mut ledger: L) {
    let gold = denom("gold");
    let silver = denom("silver");
    ledger.credit(&addr(1), &gold, Amount::new(50)).unwrap();
    ledger.credit(&addr(1), &silver, Amount::new(5)).unwrap();

    ledger
        .transfer(&addr(1), &addr(2), &gold, Amount::new(30))
        .unwrap();
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::new(20));
    assert_eq!(ledger.balance(&addr(2), &gold).unwrap(), Amount::new(30));

    // Too much: neither side moves.
    let err = ledger
        .transfer(&addr(1), &addr(2), &gold, Amount::new(21))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::new(20));
    assert_eq!(ledger.balance(&addr(2), &gold).unwrap(), Amount::new(30));

    // Self-transfer is checked but changes nothing.
    ledger
        .transfer(&addr(1), &addr(1), &gold, Amount::new(20))
        .unwrap();
    assert_eq!(ledger.balance(&addr(1), &gold).unwrap(), Amount::new(20));

    // Other denoms are untouched.
    assert_eq!(ledger.balance(&addr(1), &silver).unwrap(), Amount::new(5));
    assert_eq!(ledger.balance(&addr(2), &silver).unwrap(), Amount::ZERO);
}

#[test]
fn bank_ledger_conforms() {
    check_credit_debit(BankLedger::new());
    check_transfer(BankLedger::new());
}

#[test]
fn sled_ledger_conforms() {
    check_credit_debit(RegistryDb::open_temporary().unwrap().ledger());
    check_transfer(RegistryDb::open_temporary().unwrap().ledger());
}

#[test]
fn sled_balances_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = RegistryDb::open(dir.path()).unwrap();
        let mut ledger = db.ledger();
        ledger.credit(&addr(1), &denom("gold"), Amount::new(9)).unwrap();
        db.set_last_height(12).unwrap();
        db.flush().unwrap();
    }

    let db = RegistryDb::open(dir.path()).unwrap();
    assert_eq!(db.ledger().balance(&addr(1), &denom("gold")).unwrap(), Amount::new(9));
    assert_eq!(db.last_height().unwrap(), Some(12));
}
