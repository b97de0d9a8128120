//! # Node Configuration
//!
//! Settings come from three places, later ones winning:
//!
//! 1. Built-in defaults ([`NodeConfig::default`]).
//! 2. A TOML file, passed with `--config` or found as `config.toml` in the
//!    data directory.
//! 3. Command-line flags and their `MINTGATE_*` environment variables.
//!
//! ```toml
//! data_dir = "/var/lib/mintgate"
//! log_level = "mintgate=debug"
//! log_format = "json"
//! api_port = 9741
//!
//! [registry]
//! address_prefix = "cosmos"
//! default_page_limit = 30
//! max_page_limit = 100
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mintgate_protocol::config::RegistryConfig;

/// Default port for the read-only HTTP API.
pub const DEFAULT_API_PORT: u16 = 9741;

/// File name looked up inside the data directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Root of everything the node writes. The database lives in `db/`.
    pub data_dir: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
    /// Port for `serve`.
    pub api_port: u16,
    pub registry: RegistryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".mintgate"),
            log_level: "mintgate=info,tower_http=debug".to_string(),
            log_format: "pretty".to_string(),
            api_port: DEFAULT_API_PORT,
            registry: RegistryConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid node configuration")
    }

    /// Loads the configuration file.
    ///
    /// An explicit `path` must exist. Without one, `config.toml` in
    /// `data_dir` is used if present, and defaults otherwise.
    pub fn load(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let dir = data_dir
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| Self::default().data_dir);
                let implicit = dir.join(CONFIG_FILE_NAME);
                implicit.exists().then_some(implicit)
            }
        };

        let mut config = match candidate {
            Some(file) => {
                let raw = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read config file {}", file.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("failed to parse config file {}", file.display()))?
            }
            None => Self::default(),
        };

        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    /// Directory holding the sled database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = NodeConfig::from_toml(
            r#"
            log_format = "json"

            [registry]
            max_page_limit = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.log_format, "json");
        assert_eq!(config.api_port, DEFAULT_API_PORT);
        assert_eq!(config.registry.max_page_limit, 50);
        assert_eq!(config.registry.address_prefix, "cosmos");
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(NodeConfig::from_toml("api_port = \"high\"").is_err());
    }

    #[test]
    fn implicit_file_in_data_dir_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "api_port = 8080\n").unwrap();

        let config = NodeConfig::load(None, Some(dir.path())).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.db_path(), dir.path().join("db"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(NodeConfig::load(Some(&missing), None).is_err());
    }
}
