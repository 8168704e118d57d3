//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use molt_remote::RemoteConfig;
use molt_retirer::RetirerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `remote.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "MOLT_ACCESS_TOKEN";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Post database location; a leading `~/` is expanded
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Retirement run settings
    #[serde(default)]
    pub retirement: RetirerConfig,

    /// Remote API settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Default configuration directory (`~/.molt`).
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".molt"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there first when the file is absent.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            Ok(config)
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Take the access token from the environment when it is set there.
    pub fn apply_env(&mut self) {
        self.apply_token(std::env::var(ACCESS_TOKEN_ENV).ok());
    }

    fn apply_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.remote.access_token = token;
        }
    }

    /// Database path with `~/` expanded.
    pub fn database_path(&self) -> Result<PathBuf> {
        match self.database.strip_prefix("~") {
            Ok(rest) => {
                let home = dirs::home_dir()
                    .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
                Ok(home.join(rest))
            }
            Err(_) => Ok(self.database.clone()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            retirement: RetirerConfig::default(),
            remote: RemoteConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("~/.molt/posts.db")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
