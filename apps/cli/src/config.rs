use anyhow::{Context, Result};
use rokuecp::TextEncoding;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// ECP base URL used when `--device` is not given
    pub device: Option<String>,
    /// IPv4 address of the interface to run discovery on
    pub interface: Option<Ipv4Addr>,
    pub discovery_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_devices: Option<usize>,
    pub text_encoding: Option<TextEncoding>,
}

impl Config {
    /// Default location of the config file (platform-specific)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))?;
        Ok(config_dir.join("rokuecp").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            device = "http://192.168.1.162:8060/"
            interface = "192.168.1.20"
            discovery_timeout_secs = 3
            request_timeout_secs = 10
            max_devices = 4
            text_encoding = "latin1"
            "#,
        )
        .unwrap();

        assert_eq!(config.device.as_deref(), Some("http://192.168.1.162:8060/"));
        assert_eq!(config.interface, Some(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(config.discovery_timeout_secs, Some(3));
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(config.max_devices, Some(4));
        assert_eq!(config.text_encoding, Some(TextEncoding::Latin1));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_toml("devise = \"http://x/\"").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("rokuctl-no-such-dir").join("config.toml");
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }
}
