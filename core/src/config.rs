use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::address::{AddressFormat, DEFAULT_PREFIX};
use crate::amount::MAX_DECIMALS;
use crate::resolver::DEFAULT_NAME_SUFFIX;
use crate::token::TokenDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Custom,
}

impl Network {
    pub fn chain_id(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("phoenix-1"),
            Network::Testnet => Some("pisco-1"),
            Network::Custom => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
            Network::Custom => f.write_str("custom"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "Unknown network: '{other}'. Use 'mainnet', 'testnet', or 'custom'."
            )),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_suffix() -> String {
    DEFAULT_NAME_SUFFIX.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default = "default_prefix")]
    pub address_prefix: String,
    #[serde(default = "default_suffix")]
    pub name_suffix: String,
    #[serde(default)]
    pub token: TokenDescriptor,
    /// Connected account. No sender means no form.
    #[serde(default)]
    pub sender: Option<String>,
    /// Offline ledger with balances and name records.
    #[serde(default)]
    pub ledger: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            address_prefix: default_prefix(),
            name_suffix: default_suffix(),
            token: TokenDescriptor::default(),
            sender: None,
            ledger: None,
        }
    }
}

impl Config {
    /// `<config dir>/donate/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("donate").join("config.json"))
    }

    /// Load from `path`, or from the default location. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn address_format(&self) -> AddressFormat {
        AddressFormat::new(&self.address_prefix)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address_prefix.is_empty() {
            bail!("address_prefix cannot be empty");
        }
        if self.token.decimals > MAX_DECIMALS {
            bail!(
                "token.decimals {} is out of range (at most {MAX_DECIMALS})",
                self.token.decimals
            );
        }
        if let Some(sender) = &self.sender {
            if !self.address_format().is_valid(sender) {
                bail!("Invalid sender address '{sender}'");
            }
        }
        Ok(())
    }
}
