//! Password policy and its TOML configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

const APP_DIR: &str = "stegcrypt";
const CONFIG_FILE: &str = "config.toml";

/// Options applied by the conceal workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum password length in characters, enforced when hiding a payload.
    pub min_password_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_password_len: 6,
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// `<config_dir>/stegcrypt/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the file at the default location, or defaults when it does not exist.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject passwords shorter than `min_password_len` characters.
    pub fn check_password(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_password_len {
            return Err(Error::WeakPassword {
                minimum: self.min_password_len,
            });
        }
        Ok(())
    }
}
