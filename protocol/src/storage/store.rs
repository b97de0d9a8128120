//! Record store abstraction and the in-memory backend.
//!
//! The registry keeper talks to storage only through [`RecordStore`]. Keys
//! are denoms, values are [`DenomRecord`]s, and iteration is always in
//! ascending denom order so that pagination and genesis export are
//! deterministic.

use std::collections::BTreeMap;
use std::ops::Bound;

use thiserror::Error;

use crate::denom::{Denom, DenomRecord};

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt entry under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sorted keyed storage of denom records.
///
/// Implementations must keep at most one record per denom. Writers are
/// expected to go through the registry keeper; nothing else calls `set`
/// or `remove`.
pub trait RecordStore {
    /// Loads the record for `denom`, if any.
    fn get(&self, denom: &Denom) -> StoreResult<Option<DenomRecord>>;

    /// Inserts or overwrites the record keyed by `record.denom`.
    fn set(&mut self, record: &DenomRecord) -> StoreResult<()>;

    /// Removes the record for `denom`. Removing an absent key is a no-op.
    fn remove(&mut self, denom: &Denom) -> StoreResult<()>;

    /// Up to `limit` records with keys strictly greater than `start_after`,
    /// ascending.
    fn range(&self, start_after: Option<&Denom>, limit: usize) -> StoreResult<Vec<DenomRecord>>;

    /// Every record, ascending.
    fn all(&self) -> StoreResult<Vec<DenomRecord>>;

    /// Drops every record and writes `records` in its place.
    fn replace_all(&mut self, records: &[DenomRecord]) -> StoreResult<()>;

    /// Number of records.
    fn len(&self) -> StoreResult<usize>;

    /// Returns `true` if a record exists for `denom`.
    fn has(&self, denom: &Denom) -> StoreResult<bool> {
        Ok(self.get(denom)?.is_some())
    }

    /// Returns `true` if the store holds no records.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A `BTreeMap`-backed record store. Used by tests and by hosts that keep
/// registry state in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<Denom, DenomRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, denom: &Denom) -> StoreResult<Option<DenomRecord>> {
        Ok(self.records.get(denom).cloned())
    }

    fn set(&mut self, record: &DenomRecord) -> StoreResult<()> {
        self.records.insert(record.denom.clone(), record.clone());
        Ok(())
    }

    fn remove(&mut self, denom: &Denom) -> StoreResult<()> {
        self.records.remove(denom);
        Ok(())
    }

    fn range(&self, start_after: Option<&Denom>, limit: usize) -> StoreResult<Vec<DenomRecord>> {
        let lower = match start_after {
            Some(denom) => Bound::Excluded(denom),
            None => Bound::Unbounded,
        };
        Ok(self
            .records
            .range::<Denom, _>((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn all(&self) -> StoreResult<Vec<DenomRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn replace_all(&mut self, records: &[DenomRecord]) -> StoreResult<()> {
        self.records = records
            .iter()
            .map(|record| (record.denom.clone(), record.clone()))
            .collect();
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.records.len())
    }
}
