// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Mintgate Protocol — Core Library
//!
//! The building blocks of the Mintgate denom registry: the types it
//! persists, the storage it persists them in, the ledger it delegates value
//! movement to, and the event stream it reports into. The ownership rules
//! themselves live one crate up, in `mintgate-contracts`.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and the operator-tunable
//!   [`RegistryConfig`](config::RegistryConfig).
//! - **identity** — Bech32 account addresses and the validator that mints
//!   them. The only place an address can fail to parse.
//! - **denom** — Denom names, amounts, coins, and the `{denom, owner}`
//!   record.
//! - **storage** — The record store seam, an in-memory backend, and the
//!   sled database.
//! - **ledger** — The balance-keeping seam and an in-memory bank.
//! - **events** — Domain events and the sinks that receive them.
//!
//! ## Design Philosophy
//!
//! 1. Validate at the boundary, once. Past it, everything is a newtype.
//! 2. No arithmetic without `checked_*`. Money does not wrap.
//! 3. Every seam is a trait, so the registry can be tested without a disk.

pub mod config;
pub mod denom;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod storage;

pub use denom::{Amount, Coin, Denom, DenomError, DenomRecord};
pub use events::{EventLog, EventRecord, EventSink, RegistryEvent, TracingSink};
pub use identity::{Address, AddressError, AddressValidator};
pub use ledger::{BankLedger, Ledger, LedgerError};
pub use storage::{MemoryStore, RecordStore, RegistryDb, StoreError};
