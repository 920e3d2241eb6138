//
//  devops-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module provides configuration management for the `dvo` CLI. It handles
//! loading, saving, and accessing settings from a TOML file stored in a
//! platform-specific directory.
//!
//! ## Overview
//!
//! - **Core Configuration**: request timeout and the default connection
//! - **Connections**: one entry per organization or collection URL
//!
//! Secrets are never written here. Tokens and passwords live in the system keyring,
//! keyed by the connection URL.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/dvo/config.toml`
//! - **macOS**: `~/Library/Application Support/dvo/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\dvo\config.toml`
//!
//! Setting `DVO_CONFIG_DIR` overrides the directory.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! timeout_secs = 30
//! default_connection = "fabrikam"
//!
//! [connections.fabrikam]
//! url = "https://dev.azure.com/fabrikam"
//! default_project = "Fabrikam-Fiber"
//! auth = "pat"
//!
//! [connections.onprem]
//! url = "https://tfs.example.com/tfs/DefaultCollection"
//! auth = "basic"
//! username = "DOMAIN\\jdoe"
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`connections`]: Connection URL utilities

mod connections;
mod file;

pub use connections::*;
pub use file::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::auth::AuthKind;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "DVO_CONFIG_DIR";

/// Global configuration container.
///
/// # Fields
///
/// * `core` - Settings that apply to every command
/// * `connections` - Named connections to organizations or collections
///
/// # Examples
///
/// ```rust
/// use devops_client::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.core.timeout_secs, 30);
/// assert!(config.connections.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Core settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Connection name to connection settings.
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

/// Core configuration options.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `timeout_secs` | `30` |
/// | `default_connection` | `None` |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    /// Per-request timeout, enforced by the HTTP transport. `0` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection used when `--connection` is not given.
    #[serde(default)]
    pub default_connection: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            default_connection: None,
        }
    }
}

impl CoreConfig {
    /// The request timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Settings for one organization or collection.
///
/// # Examples
///
/// ```rust
/// use devops_client::auth::AuthKind;
/// use devops_client::config::ConnectionConfig;
///
/// let connection = ConnectionConfig::new("https://dev.azure.com/fabrikam/");
/// assert_eq!(connection.url, "https://dev.azure.com/fabrikam");
/// assert_eq!(connection.auth, AuthKind::Pat);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConnectionConfig {
    /// Organization or collection URL, normalized.
    pub url: String,

    /// Project used when a command needs one and none is given.
    #[serde(default)]
    pub default_project: Option<String>,

    /// How the stored secret is presented to the server.
    #[serde(default)]
    pub auth: AuthKind,

    /// User name for basic authentication.
    #[serde(default)]
    pub username: Option<String>,
}

impl ConnectionConfig {
    /// Creates a PAT connection for `url`.
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_url(url),
            ..Self::default()
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid configuration file {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Returns the path to the configuration file.
    ///
    /// | Platform | Path |
    /// |----------|------|
    /// | Linux | `~/.config/dvo/config.toml` |
    /// | macOS | `~/Library/Application Support/dvo/config.toml` |
    /// | Windows | `C:\Users\<User>\AppData\Roaming\dvo\config.toml` |
    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }

        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns a connection by name.
    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }

    /// Picks the connection to use: the named one, else the default one, else the
    /// only one configured.
    ///
    /// # Errors
    ///
    /// Fails when the name is unknown, or nothing can be picked.
    pub fn resolve_connection(&self, name: Option<&str>) -> Result<(String, &ConnectionConfig)> {
        let name = match name.or(self.core.default_connection.as_deref()) {
            Some(name) => name.to_string(),
            None if self.connections.len() == 1 => self
                .connections
                .keys()
                .next()
                .cloned()
                .unwrap_or_default(),
            None => anyhow::bail!(
                "No connection selected. Run `dvo auth login` or pass --connection."
            ),
        };

        let connection = self.connections.get(&name).ok_or_else(|| {
            anyhow::anyhow!("Unknown connection '{}'. Run `dvo auth status` to list them.", name)
        })?;
        Ok((name, connection))
    }

    /// Gets a configuration value by key.
    ///
    /// # Supported Keys
    ///
    /// | Key | Field |
    /// |-----|-------|
    /// | `timeout_secs` | `core.timeout_secs` |
    /// | `default_connection` | `core.default_connection` |
    /// | `<name>.url` | `connections.<name>.url` |
    /// | `<name>.default_project` | `connections.<name>.default_project` |
    /// | `<name>.auth` | `connections.<name>.auth` |
    /// | `<name>.username` | `connections.<name>.username` |
    ///
    /// # Examples
    ///
    /// ```rust
    /// use devops_client::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("timeout_secs"), Some("30".to_string()));
    /// assert_eq!(config.get("default_connection"), None);
    /// assert_eq!(config.get("unknown_key"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "timeout_secs" => Some(self.core.timeout_secs.to_string()),
            "default_connection" => self.core.default_connection.clone(),
            _ => {
                let (name, field) = key.split_once('.')?;
                let connection = self.connections.get(name)?;
                match field {
                    "url" => Some(connection.url.clone()),
                    "default_project" => connection.default_project.clone(),
                    "auth" => Some(connection.auth.to_string()),
                    "username" => connection.username.clone(),
                    _ => None,
                }
            }
        }
    }

    /// Sets a configuration value by key. See [`Config::get`] for the keys.
    ///
    /// Setting `<name>.url` creates the connection if needed.
    ///
    /// # Errors
    ///
    /// Fails for unknown keys and values that do not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "timeout_secs" => {
                self.core.timeout_secs = value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a number, got '{}'", value))?;
            }
            "default_connection" => {
                self.core.default_connection = Some(value.to_string());
            }
            _ => {
                let Some((name, field)) = key.split_once('.') else {
                    anyhow::bail!("Unknown configuration key '{}'", key);
                };

                if field == "url" {
                    self.connections
                        .entry(name.to_string())
                        .or_insert_with(|| ConnectionConfig::new(value))
                        .url = normalize_url(value);
                    return Ok(());
                }

                let connection = self
                    .connections
                    .get_mut(name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown connection '{}'", name))?;
                match field {
                    "default_project" => connection.default_project = Some(value.to_string()),
                    "auth" => connection.auth = value.parse()?,
                    "username" => connection.username = Some(value.to_string()),
                    _ => anyhow::bail!("Unknown configuration key '{}'", key),
                }
            }
        }
        Ok(())
    }

    /// Every key with a value, in a stable order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut keys = vec!["timeout_secs".to_string(), "default_connection".to_string()];
        for name in self.connections.keys() {
            for field in ["url", "default_project", "auth", "username"] {
                keys.push(format!("{}.{}", name, field));
            }
        }

        keys.into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("fabrikam.url", "https://dev.azure.com/fabrikam/").unwrap();
        config.set("fabrikam.default_project", "Fiber").unwrap();
        config.set("default_connection", "fabrikam").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.get("fabrikam.url"),
            Some("https://dev.azure.com/fabrikam".to_string())
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[core\ntimeout_secs = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration file"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("timeout_secs", "soon").is_err());
        assert!(config.set("nope", "x").is_err());
        assert!(config.set("ghost.default_project", "x").is_err());

        config.set("onprem.url", "https://tfs.example.com/tfs/DefaultCollection").unwrap();
        config.set("onprem.auth", "basic").unwrap();
        assert_eq!(config.get("onprem.auth"), Some("basic".to_string()));
        assert!(config.set("onprem.auth", "kerberos").is_err());
    }

    #[test]
    fn test_resolve_connection() {
        let mut config = Config::default();
        assert!(config.resolve_connection(None).is_err());

        config.set("a.url", "https://dev.azure.com/a").unwrap();
        assert_eq!(config.resolve_connection(None).unwrap().0, "a");

        config.set("b.url", "https://dev.azure.com/b").unwrap();
        assert!(config.resolve_connection(None).is_err());
        assert_eq!(config.resolve_connection(Some("b")).unwrap().0, "b");

        config.set("default_connection", "a").unwrap();
        assert_eq!(config.resolve_connection(None).unwrap().1.url, "https://dev.azure.com/a");
        assert!(config.resolve_connection(Some("c")).is_err());
    }

    #[test]
    fn test_timeout_zero_disables() {
        let mut core = CoreConfig::default();
        assert_eq!(core.timeout(), Some(Duration::from_secs(30)));
        core.timeout_secs = 0;
        assert_eq!(core.timeout(), None);
    }

    #[test]
    fn test_entries_are_stable() {
        let mut config = Config::default();
        config.set("x.url", "https://dev.azure.com/x").unwrap();
        let keys: Vec<_> = config.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["timeout_secs", "x.url", "x.auth"]);
    }
}
