//! Errors returned by registry operations.

use mintgate_protocol::{AddressError, Denom, DenomError, LedgerError, StoreError};
use thiserror::Error;

/// Everything that can abort a registry operation.
///
/// Every variant is terminal for the operation that produced it. Nothing is
/// retried inside the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An account identifier failed validation. Raised before any lookup.
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        /// Which input carried the bad address (`owner`, `recipient`, ...).
        field: &'static str,
        #[source]
        source: AddressError,
    },

    /// The denom name is syntactically invalid. Raised before any lookup.
    #[error("invalid denom: {0}")]
    InvalidDenom(#[from] DenomError),

    /// The referenced denom has no record.
    #[error("denom `{0}` does not exist")]
    NotFound(Denom),

    /// A create collided with an existing record.
    #[error("denom `{0}` already exists")]
    AlreadyExists(Denom),

    /// The claimed owner is not the record's owner.
    #[error("incorrect owner: `{claimant}` does not own denom `{denom}`")]
    Unauthorized {
        /// The denom being administered.
        denom: Denom,
        /// The identity that claimed ownership, as supplied.
        claimant: String,
    },

    /// Surfaced unchanged from the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The record store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Stable snake_case name of the error kind, for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::InvalidAddress { .. } => "invalid_address",
            RegistryError::InvalidDenom(_) => "invalid_denom",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::AlreadyExists(_) => "already_exists",
            RegistryError::Unauthorized { .. } => "unauthorized",
            RegistryError::Ledger(_) => "ledger_error",
            RegistryError::Store(_) => "store_error",
        }
    }
}
