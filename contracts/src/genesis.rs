//! Bulk import and export of the record set.
//!
//! Genesis bypasses ownership checks and emits no events: it is the host
//! restoring state, not a user acting on it. Balances are not part of the
//! genesis state; they belong to the ledger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use mintgate_protocol::{AddressError, Denom, DenomRecord, EventSink, Ledger, RecordStore};

use crate::error::RegistryError;
use crate::registry::DenomRegistry;

/// Errors raised while importing a genesis state.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("duplicated denom `{0}` in genesis state")]
    DuplicateDenom(Denom),

    #[error("owner of denom `{denom}` is not a valid address: {source}")]
    InvalidOwner {
        denom: Denom,
        #[source]
        source: AddressError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The full record set, in ascending denom order when exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub denoms: Vec<DenomRecord>,
}

impl GenesisState {
    pub fn new(denoms: Vec<DenomRecord>) -> Self {
        Self { denoms }
    }

    /// Rejects a state that lists the same denom twice.
    pub fn validate(&self) -> Result<(), GenesisError> {
        let mut seen = BTreeSet::new();
        for record in &self.denoms {
            if !seen.insert(&record.denom) {
                return Err(GenesisError::DuplicateDenom(record.denom.clone()));
            }
        }
        Ok(())
    }
}

impl<S, L, E> DenomRegistry<S, L, E>
where
    S: RecordStore,
    L: Ledger,
    E: EventSink,
{
    /// Replaces every record with the contents of `genesis`.
    ///
    /// The state is validated in full first, including each owner against
    /// this registry's address prefix. Nothing is written unless all of it
    /// is valid.
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> Result<(), GenesisError> {
        genesis.validate()?;
        for record in &genesis.denoms {
            self.addresses
                .parse(record.owner.as_str())
                .map_err(|source| GenesisError::InvalidOwner {
                    denom: record.denom.clone(),
                    source,
                })?;
        }

        self.replace_all(&genesis.denoms)?;
        info!(denoms = genesis.denoms.len(), "genesis imported");
        Ok(())
    }

    /// Snapshot of every record.
    pub fn export_genesis(&self) -> Result<GenesisState, RegistryError> {
        Ok(GenesisState::new(self.all_denoms()?))
    }
}
