//! Configuration management for typings resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default CDN serving raw package files.
pub const DEFAULT_CDN_URL: &str = "https://cdn.jsdelivr.net";

/// Default API serving version resolution and file listings.
pub const DEFAULT_DATA_URL: &str = "https://data.jsdelivr.com/v1";

/// Name of the rc file read from the home and working directories.
const RC_FILE: &str = ".stypesrc";

/// Prefix of environment variables that override configuration.
const ENV_PREFIX: &str = "STYPES_";

/// Configuration for typings resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CDN base URL for `package.json` and file contents
    pub cdn_url: String,

    /// API base URL for version resolution and file listings
    pub data_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Whether a project manifest contributes its devDependencies too
    pub include_dev: bool,

    /// Whether a project manifest contributes its peerDependencies too
    pub include_peer: bool,

    /// Unknown keys, kept so `get` can report them back
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cdn_url: DEFAULT_CDN_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: 30,
            connect_timeout: 10,
            user_agent: format!("spacey-typings/{}", env!("CARGO_PKG_VERSION")),
            include_dev: false,
            include_peer: false,
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Later sources win: defaults, `~/.stypesrc`, `./.stypesrc`, then
    /// `STYPES_*` environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                config.merge_from_file(&user_config_path)?;
            }
        }

        let project_rc = PathBuf::from(RC_FILE);
        if project_rc.exists() {
            config.merge_from_file(&project_rc)?;
        }

        config.merge_from_env(std::env::vars());

        Ok(config)
    }

    /// Merge configuration from an rc file.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_from_str(&content);
        Ok(())
    }

    /// Merge `key=value` lines; `#` and `;` start comments.
    pub fn merge_from_str(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim());
            }
        }
    }

    /// Merge `STYPES_*` variables, e.g. `STYPES_CDN_URL` sets `cdn-url`.
    pub fn merge_from_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, &value);
            }
        }
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "cdn-url" | "cdn" => self.cdn_url = value.trim_end_matches('/').to_string(),
            "data-url" | "data" => self.data_url = value.trim_end_matches('/').to_string(),
            "timeout" => {
                if let Ok(n) = value.parse() {
                    self.timeout = n;
                }
            }
            "connect-timeout" => {
                if let Ok(n) = value.parse() {
                    self.connect_timeout = n;
                }
            }
            "user-agent" => self.user_agent = value.to_string(),
            "include-dev" => self.include_dev = value == "true",
            "include-peer" => self.include_peer = value == "true",
            _ => {
                self.extra.insert(
                    key.to_string(),
                    serde_json::Value::String(value.to_string()),
                );
            }
        }
    }

    /// Get a configuration value.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "cdn-url" | "cdn" => Some(self.cdn_url.clone()),
            "data-url" | "data" => Some(self.data_url.clone()),
            "timeout" => Some(self.timeout.to_string()),
            "connect-timeout" => Some(self.connect_timeout.to_string()),
            "user-agent" => Some(self.user_agent.clone()),
            "include-dev" => Some(self.include_dev.to_string()),
            "include-peer" => Some(self.include_peer.to_string()),
            _ => self.extra.get(key).and_then(|v| v.as_str().map(String::from)),
        }
    }
}

/// Get the user config path.
fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(RC_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cdn_url, DEFAULT_CDN_URL);
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        assert_eq!(config.timeout, 30);
        assert!(!config.include_dev);
        assert!(!config.include_peer);
    }

    #[test]
    fn test_merge_from_str() {
        let mut config = Config::default();
        config.merge_from_str(
            "# mirrors\ncdn-url = https://mirror.example/\n; comment\n\
             timeout=5\ntimeout=not-a-number\ncolor=never\n",
        );
        assert_eq!(config.cdn_url, "https://mirror.example");
        assert_eq!(config.timeout, 5);
        assert_eq!(config.get("color").as_deref(), Some("never"));
    }

    #[test]
    fn test_merge_from_env() {
        let mut config = Config::default();
        config.merge_from_env([
            ("STYPES_DATA_URL".to_string(), "http://localhost:8080/v1".to_string()),
            ("STYPES_INCLUDE_DEV".to_string(), "true".to_string()),
            ("STYPES_INCLUDE_PEER".to_string(), "true".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ]);
        assert_eq!(config.data_url, "http://localhost:8080/v1");
        assert!(config.include_dev);
        assert!(config.include_peer);
        assert_eq!(config.get("include-peer").as_deref(), Some("true"));
        assert_eq!(config.get("path"), None);
    }

    #[test]
    fn test_merge_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RC_FILE);
        std::fs::write(&path, "connect-timeout=3\n").unwrap();

        let mut config = Config::default();
        config.merge_from_file(&path).unwrap();
        assert_eq!(config.connect_timeout, 3);
    }
}
