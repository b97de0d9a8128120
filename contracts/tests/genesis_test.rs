//! Integration tests for genesis import and export.

use mintgate_contracts::{Context, DenomRegistry, GenesisError, GenesisState};
use mintgate_protocol::config::RegistryConfig;
use mintgate_protocol::{
    AddressValidator, BankLedger, Denom, DenomRecord, EventLog, MemoryStore, RegistryDb,
};

type Registry = DenomRegistry<MemoryStore, BankLedger, EventLog>;

fn registry() -> Registry {
    DenomRegistry::with_defaults(MemoryStore::new(), BankLedger::new(), EventLog::new())
}

fn addr(seed: u8) -> String {
    AddressValidator::default()
        .encode(&[seed; 20])
        .unwrap()
        .to_string()
}

fn record(denom: &str, seed: u8) -> DenomRecord {
    DenomRecord::new(
        Denom::new(denom).unwrap(),
        AddressValidator::default().parse(&addr(seed)).unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Export / Import
// ---------------------------------------------------------------------------

#[test]
fn export_then_import_into_fresh_registry() {
    let mut source = registry();
    let ctx = Context::default();
    source.create_denom(&ctx, "silver", &addr(2)).unwrap();
    source.create_denom(&ctx, "gold", &addr(1)).unwrap();

    let genesis = source.export_genesis().unwrap();
    let names: Vec<&str> = genesis.denoms.iter().map(|r| r.denom.as_str()).collect();
    assert_eq!(names, vec!["gold", "silver"]);

    let mut target = registry();
    target.init_genesis(&genesis).unwrap();
    assert_eq!(target.export_genesis().unwrap(), genesis);

    // Imported owners keep their powers.
    target.delete_denom(&ctx, &addr(1), "gold").unwrap();
}

#[test]
fn import_replaces_existing_records_without_events() {
    let mut reg = registry();
    reg.create_denom(&Context::default(), "copper", &addr(1)).unwrap();

    let genesis = GenesisState::new(vec![record("gold", 3)]);
    reg.init_genesis(&genesis).unwrap();

    assert_eq!(reg.get_denom("copper").unwrap(), None);
    assert_eq!(reg.get_denom("gold").unwrap(), Some(record("gold", 3)));
    assert_eq!(reg.events().kinds(), vec!["denom_created"]);
}

#[test]
fn genesis_json_shape() {
    let genesis = GenesisState::new(vec![record("gold", 1)]);
    let json = serde_json::to_value(&genesis).unwrap();
    assert_eq!(json["denoms"][0]["denom"], "gold");
    assert_eq!(json["denoms"][0]["owner"], addr(1));

    let back: GenesisState = serde_json::from_value(json).unwrap();
    assert_eq!(back, genesis);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn duplicate_denoms_are_rejected_and_nothing_is_written() {
    let mut reg = registry();
    reg.create_denom(&Context::default(), "copper", &addr(1)).unwrap();

    let genesis = GenesisState::new(vec![record("gold", 1), record("gold", 2)]);
    let err = reg.init_genesis(&genesis).unwrap_err();
    assert!(matches!(err, GenesisError::DuplicateDenom(ref d) if d.as_str() == "gold"));
    assert!(reg.get_denom("copper").unwrap().is_some());
}

#[test]
fn owners_must_match_the_registry_prefix() {
    let config = RegistryConfig {
        address_prefix: "mint".into(),
        ..RegistryConfig::default()
    };
    let mut reg =
        DenomRegistry::new(MemoryStore::new(), BankLedger::new(), EventLog::new(), config).unwrap();

    let err = reg
        .init_genesis(&GenesisState::new(vec![record("gold", 1)]))
        .unwrap_err();
    assert!(matches!(err, GenesisError::InvalidOwner { .. }));
    assert_eq!(reg.denom_count().unwrap(), 0);
}

#[test]
fn sled_import_is_a_full_swap() {
    let db = RegistryDb::open_temporary().unwrap();
    let mut reg = DenomRegistry::with_defaults(db.record_store(), db.ledger(), EventLog::new());
    reg.create_denom(&Context::default(), "copper", &addr(1)).unwrap();

    reg.init_genesis(&GenesisState::new(vec![record("gold", 1), record("tin", 2)]))
        .unwrap();

    let names: Vec<String> = reg
        .all_denoms()
        .unwrap()
        .into_iter()
        .map(|r| r.denom.to_string())
        .collect();
    assert_eq!(names, vec!["gold", "tin"]);
}
