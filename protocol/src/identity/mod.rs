//! # Identity Module
//!
//! Account identity for the registry. Every participant is a bech32
//! address; the registry never looks at keys or signatures, only at the
//! validated address the host hands it.
//!
//! - **Address** — normalized, validated account identifier.
//! - **AddressValidator** — the single gate that turns strings into
//!   addresses, configured with the chain's bech32 prefix.

pub mod address;

pub use address::{Address, AddressError, AddressValidator};
