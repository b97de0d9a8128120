//! # Denoms, Amounts, and Records
//!
//! The registry's data model. A [`DenomRecord`] is the only thing the
//! registry persists: a denom name and the single account that owns it.
//! [`Amount`] is the one integer type used for every quantity that crosses
//! the ledger boundary; the denom's smallest unit is atomic, so there are no
//! fractions anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DENOM_EXTRA_CHARS, MAX_DENOM_LEN, MIN_DENOM_LEN};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a denom name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenomError {
    /// Too short or too long.
    #[error("invalid denom length {len}: must be between {min} and {max} characters")]
    InvalidLength {
        /// Length of the rejected name.
        len: usize,
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },

    /// The first character is not an ASCII letter.
    #[error("invalid denom '{0}': must start with a letter")]
    InvalidStart(String),

    /// A character outside the allowed set.
    #[error("invalid denom '{denom}': character '{ch}' is not allowed")]
    InvalidCharacter {
        /// The rejected name.
        denom: String,
        /// The offending character.
        ch: char,
    },
}

// ---------------------------------------------------------------------------
// Denom
// ---------------------------------------------------------------------------

/// A validated denom name.
///
/// Grammar: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Denom(String);

impl Denom {
    /// Validates `raw` as a denom name.
    pub fn new(raw: impl Into<String>) -> Result<Self, DenomError> {
        let raw = raw.into();
        let len = raw.chars().count();
        if !(MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&len) {
            return Err(DenomError::InvalidLength {
                len,
                min: MIN_DENOM_LEN,
                max: MAX_DENOM_LEN,
            });
        }

        let mut chars = raw.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(DenomError::InvalidStart(raw));
        }
        if let Some(ch) = chars.find(|c| !c.is_ascii_alphanumeric() && !DENOM_EXTRA_CHARS.contains(c)) {
            return Err(DenomError::InvalidCharacter { denom: raw, ch });
        }

        Ok(Self(raw))
    }

    /// The denom name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key bytes used by the record store.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Denom {
    type Err = DenomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Denom::new(s)
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Denom({})", self.0)
    }
}

impl<'de> Deserialize<'de> for Denom {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Denom::new(s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A non-negative token quantity in the denom's smallest unit.
///
/// Bounded by `u64::MAX`. All arithmetic goes through the checked helpers;
/// there is no wrapping anywhere.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero units.
    pub const ZERO: Amount = Amount(0);

    /// Largest representable amount.
    pub const MAX: Amount = Amount(u64::MAX);

    /// Wraps a raw unit count.
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// The raw unit count.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// `self - rhs`, or `None` if `rhs > self`.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An amount of one denom. Displays as `"<amount><denom>"`, e.g. `30gold`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// The denom.
    pub denom: Denom,
    /// The quantity.
    pub amount: Amount,
}

impl Coin {
    /// Pairs an amount with its denom.
    pub fn new(amount: Amount, denom: Denom) -> Self {
        Self { denom, amount }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ---------------------------------------------------------------------------
// DenomRecord
// ---------------------------------------------------------------------------

/// The persisted `{denom, owner}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomRecord {
    /// Unique, immutable key.
    pub denom: Denom,
    /// The single account allowed to administer this denom.
    pub owner: Address,
}

impl DenomRecord {
    /// Builds a record.
    pub fn new(denom: Denom, owner: Address) -> Self {
        Self { denom, owner }
    }

    /// Returns `true` if `claimant` is the current owner.
    pub fn is_owned_by(&self, claimant: &Address) -> bool {
        &self.owner == claimant
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_denoms() {
        for raw in ["gold", "uatom", "factory/cosmos1abc/silver", "ibc:x.y_z-1", "abc"] {
            assert!(Denom::new(raw).is_ok(), "{raw} should be valid");
        }
    }

    #[test]
    fn rejects_bad_length() {
        assert!(matches!(Denom::new("ab"), Err(DenomError::InvalidLength { len: 2, .. })));
        let long = format!("a{}", "b".repeat(MAX_DENOM_LEN));
        assert!(matches!(Denom::new(long), Err(DenomError::InvalidLength { .. })));
    }

    #[test]
    fn rejects_bad_start_and_characters() {
        assert!(matches!(Denom::new("1gold"), Err(DenomError::InvalidStart(_))));
        assert!(matches!(Denom::new("/gold"), Err(DenomError::InvalidStart(_))));
        assert!(matches!(
            Denom::new("go ld"),
            Err(DenomError::InvalidCharacter { ch: ' ', .. })
        ));
        assert!(matches!(
            Denom::new("gold$"),
            Err(DenomError::InvalidCharacter { ch: '$', .. })
        ));
    }

    #[test]
    fn denom_deserialization_validates() {
        let ok: Denom = serde_json::from_str("\"gold\"").unwrap();
        assert_eq!(ok.as_str(), "gold");
        assert!(serde_json::from_str::<Denom>("\"x\"").is_err());
    }

    #[test]
    fn coin_formats_amount_then_denom() {
        let coin = Coin::new(Amount::new(30), Denom::new("gold").unwrap());
        assert_eq!(coin.to_string(), "30gold");
    }

    #[test]
    fn amount_arithmetic_is_checked() {
        assert_eq!(Amount::new(2).checked_add(Amount::new(3)), Some(Amount::new(5)));
        assert_eq!(Amount::MAX.checked_add(Amount::new(1)), None);
        assert_eq!(Amount::new(1).checked_sub(Amount::new(2)), None);
        assert!(Amount::ZERO.is_zero());
    }

    #[test]
    fn amount_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Amount::new(100)).unwrap(), "100");
        let a: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(a.get(), 42);
        assert!(serde_json::from_str::<Amount>("-1").is_err());
    }
}
