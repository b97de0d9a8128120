//! # Mintgate Contracts
//!
//! The ownership rules of the Mintgate denom registry. Every denom has
//! exactly one owner, and only that owner can hand it over, delete it, mint
//! it, or authorize moving it between accounts.
//!
//! - **registry** — [`DenomRegistry`], the keeper: create, update, delete,
//!   and the read-side queries.
//! - **authorizer** — mint and transfer, gated on ownership and delegated
//!   to a [`Ledger`](mintgate_protocol::Ledger).
//! - **msg** — [`ExecuteMsg`], the serializable form of every operation.
//! - **genesis** — whole-state import and export.
//!
//! ## Design Principles
//!
//! 1. Check everything, then mutate once. A rejected operation leaves no
//!    trace: no record change, no ledger change, no event.
//! 2. Ownership is compared on parsed addresses, never on raw strings.
//! 3. The registry holds no balances. Value lives in the ledger.

pub mod authorizer;
pub mod error;
pub mod genesis;
pub mod msg;
pub mod registry;

pub use error::RegistryError;
pub use genesis::{GenesisError, GenesisState};
pub use msg::{ExecuteMsg, ExecuteResponse};
pub use registry::{Context, DenomRegistry};
