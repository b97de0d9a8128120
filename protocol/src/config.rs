//! # Registry Configuration & Constants
//!
//! Every magic number in Mintgate lives here. If you're hardcoding a denom
//! length or a page size somewhere else, move it here.
//!
//! Constants describe the rules of the host chain (address prefix, denom
//! grammar). [`RegistryConfig`] carries the subset an operator is allowed to
//! tune, and is what the node reads from its TOML file.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Registry state-machine version. Bump when the meaning of a stored record
/// or an emitted event changes.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Default bech32 human-readable prefix for account addresses.
pub const DEFAULT_ADDRESS_PREFIX: &str = "cosmos";

/// Maximum decoded address payload length in bytes. Matches the account
/// address format check of the host chain: anything from 1 to 255 bytes
/// is a well-formed account.
pub const MAX_ADDRESS_PAYLOAD_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Denoms
// ---------------------------------------------------------------------------

/// Shortest acceptable denom, in characters.
pub const MIN_DENOM_LEN: usize = 3;

/// Longest acceptable denom, in characters.
pub const MAX_DENOM_LEN: usize = 128;

/// Characters allowed after the leading letter of a denom, in addition to
/// ASCII alphanumerics.
pub const DENOM_EXTRA_CHARS: &[char] = &['/', ':', '.', '_', '-'];

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Page size used by list queries when the caller doesn't ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

/// Hard cap on list query page size. Larger requests are clamped.
pub const MAX_PAGE_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Operator-tunable registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Bech32 prefix every account address must carry.
    pub address_prefix: String,
    /// Page size for list queries when none is given.
    pub default_page_limit: u32,
    /// Upper bound on list query page size.
    pub max_page_limit: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl RegistryConfig {
    /// Resolves a caller-supplied page limit against the configured default
    /// and cap.
    pub fn page_limit(&self, requested: Option<u32>) -> usize {
        requested
            .unwrap_or(self.default_page_limit)
            .min(self.max_page_limit) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_protocol_constants() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.address_prefix, DEFAULT_ADDRESS_PREFIX);
        assert_eq!(cfg.default_page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(cfg.max_page_limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn page_limit_is_clamped() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.page_limit(None), DEFAULT_PAGE_LIMIT as usize);
        assert_eq!(cfg.page_limit(Some(5)), 5);
        assert_eq!(cfg.page_limit(Some(10_000)), MAX_PAGE_LIMIT as usize);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: RegistryConfig = serde_json::from_str(r#"{"address_prefix":"osmo"}"#).unwrap();
        assert_eq!(cfg.address_prefix, "osmo");
        assert_eq!(cfg.max_page_limit, MAX_PAGE_LIMIT);
    }
}
