//! # Account Addresses
//!
//! An [`Address`] is the only way an account identifier travels through the
//! registry once it has passed the boundary. Raw strings come in from the
//! host, go through [`AddressValidator::parse`], and come out either as a
//! normalized `Address` or as an [`AddressError`]. Nothing else in the crate
//! builds addresses, so "is this a valid account?" is answered in exactly
//! one place.
//!
//! ```text
//! "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu"
//!     -> bech32 decode (checksum, single case)
//!     -> prefix == configured HRP
//!     -> 1..=255 byte payload
//!     -> Address (lower-case)
//! ```

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{DEFAULT_ADDRESS_PREFIX, MAX_ADDRESS_PAYLOAD_LEN};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an account identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input string was empty.
    #[error("empty address string is not allowed")]
    Empty,

    /// The string is not valid bech32 (bad checksum, mixed case, bad chars).
    #[error("decoding bech32 failed: {0}")]
    Bech32Decode(String),

    /// The address was encoded for a different prefix.
    #[error("invalid Bech32 prefix; expected {expected}, got {got}")]
    InvalidPrefix {
        /// The configured prefix.
        expected: String,
        /// The prefix found in the input.
        got: String,
    },

    /// The decoded payload has an unacceptable length.
    #[error("address length must be between 1 and {max} bytes, got {got}")]
    InvalidLength {
        /// Decoded payload length.
        got: usize,
        /// Maximum payload length.
        max: usize,
    },

    /// The configured prefix itself is not a valid bech32 HRP.
    #[error("invalid address prefix '{0}'")]
    InvalidHrp(String),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A validated, lower-case bech32 account address.
///
/// Equality is plain string equality on the normalized form, which is what
/// the ownership checks rely on.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(String);

impl Address {
    /// Returns the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds an address read back from storage or a snapshot.
    ///
    /// Only the bech32 encoding is re-checked here; the prefix was enforced
    /// by the validator when the value was first written.
    fn from_stored(s: &str) -> Result<Self, AddressError> {
        let (_, data) = decode(s)?;
        check_payload(&data)?;
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_stored(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AddressValidator
// ---------------------------------------------------------------------------

/// Parses and normalizes account identifiers for one bech32 prefix.
#[derive(Debug, Clone)]
pub struct AddressValidator {
    hrp: Hrp,
}

impl AddressValidator {
    /// Creates a validator for the given human-readable prefix.
    pub fn new(prefix: &str) -> Result<Self, AddressError> {
        let hrp = Hrp::parse(prefix).map_err(|_| AddressError::InvalidHrp(prefix.to_string()))?;
        Ok(Self { hrp })
    }

    /// The lower-case prefix this validator accepts.
    pub fn prefix(&self) -> String {
        self.hrp.to_lowercase()
    }

    /// Validates `raw` and returns the normalized [`Address`].
    pub fn parse(&self, raw: &str) -> Result<Address, AddressError> {
        let (hrp, data) = decode(raw)?;

        let got = hrp.to_lowercase();
        let expected = self.prefix();
        if got != expected {
            return Err(AddressError::InvalidPrefix { expected, got });
        }

        check_payload(&data)?;

        Ok(Address(raw.to_ascii_lowercase()))
    }

    /// The `isValidAddress` predicate.
    pub fn is_valid(&self, raw: &str) -> bool {
        self.parse(raw).is_ok()
    }

    /// Encodes a raw account payload under this validator's prefix.
    pub fn encode(&self, payload: &[u8]) -> Result<Address, AddressError> {
        check_payload(payload)?;
        let encoded = bech32::encode::<Bech32>(self.hrp, payload)
            .map_err(|e| AddressError::Bech32Decode(e.to_string()))?;
        Ok(Address(encoded))
    }
}

impl Default for AddressValidator {
    fn default() -> Self {
        Self {
            hrp: Hrp::parse_unchecked(DEFAULT_ADDRESS_PREFIX),
        }
    }
}

fn decode(raw: &str) -> Result<(Hrp, Vec<u8>), AddressError> {
    if raw.trim().is_empty() {
        return Err(AddressError::Empty);
    }
    bech32::decode(raw).map_err(|e| AddressError::Bech32Decode(e.to_string()))
}

fn check_payload(data: &[u8]) -> Result<(), AddressError> {
    if data.is_empty() || data.len() > MAX_ADDRESS_PAYLOAD_LEN {
        return Err(AddressError::InvalidLength {
            got: data.len(),
            max: MAX_ADDRESS_PAYLOAD_LEN,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
