//! # Storage Module
//!
//! Where denom records live.
//!
//! ```text
//! store.rs — RecordStore trait + in-memory BTreeMap backend
//! db.rs    — sled persistence: records, balances, host metadata
//! ```
//!
//! The registry keeper is the only writer of records. Hosts that persist
//! state open a [`RegistryDb`] and hand its [`SledRecordStore`] and
//! [`SledLedger`](db::SledLedger) to the keeper; tests use [`MemoryStore`].

pub mod db;
pub mod store;

pub use db::{RegistryDb, SledLedger, SledRecordStore};
pub use store::{MemoryStore, RecordStore, StoreError, StoreResult};
