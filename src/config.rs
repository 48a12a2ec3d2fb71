use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::{deserialize_duration, serialize_duration};
use crate::holdings::DustPolicy;
use crate::models::STABLECOIN_DENOM;
use crate::prices::providers::coingecko::COINGECKO_API_BASE;
use crate::prices::providers::coinpaprika::COINPAPRIKA_API_BASE;
use crate::prices::providers::fcd::FCD_BASE_URL;
use crate::prices::providers::frankfurter::FRANKFURTER_BASE_URL;

const CACHE_FILE_NAME: &str = "price-cache.json";

/// Denom quotes are requested against when nothing else is configured.
fn default_display_currency() -> String {
    STABLECOIN_DENOM.to_string()
}

/// Default reference price TTL (5 minutes).
fn default_price_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Default FX table TTL (12 hours).
fn default_fx_ttl() -> Duration {
    Duration::from_secs(12 * 60 * 60)
}

/// Refresh windows for remote data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// How long a cached stablecoin or staking price is served without a refresh.
    /// Also the retry backoff after every source failed.
    #[serde(
        default = "default_price_ttl",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub price_ttl: Duration,

    /// How long the FX table is kept before it is fetched again.
    #[serde(
        default = "default_fx_ttl",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub fx_ttl: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            price_ttl: default_price_ttl(),
            fx_ttl: default_fx_ttl(),
        }
    }
}

/// FX table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// ISO codes whose USD value is tracked.
    pub currencies: Vec<String>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            currencies: vec!["MNT".to_string(), "TWD".to_string()],
        }
    }
}

/// Dust filter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Policy applied on the standard network. The legacy network always uses
    /// the value policy.
    pub standard_policy: DustPolicy,
}

/// Base URLs of the remote sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub coingecko_base_url: String,
    pub coinpaprika_base_url: String,
    pub frankfurter_base_url: String,
    pub fcd_base_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: COINGECKO_API_BASE.to_string(),
            coinpaprika_base_url: COINPAPRIKA_API_BASE.to_string(),
            frankfurter_base_url: FRANKFURTER_BASE_URL.to_string(),
            fcd_base_url: FCD_BASE_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the price cache file. If relative, resolved from config file location.
    /// If not specified, defaults to the user cache directory.
    pub cache_path: Option<PathBuf>,

    /// Denom the wallet prefers to see values in (e.g., "uusd").
    #[serde(default = "default_display_currency")]
    pub display_currency: String,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub fx: FxConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: None,
            display_currency: default_display_currency(),
            refresh: RefreshConfig::default(),
            fx: FxConfig::default(),
            filter: FilterConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the price cache path.
    ///
    /// A relative `cache_path` is resolved against `config_dir`. Without one,
    /// the file lives in the user cache directory, or next to the config when
    /// there is none.
    pub fn resolve_cache_path(&self, config_dir: &Path) -> PathBuf {
        match &self.cache_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => config_dir.join(path),
            None => dirs::cache_dir()
                .map(|dir| dir.join("wallet-holdings").join(CACHE_FILE_NAME))
                .unwrap_or_else(|| config_dir.join(CACHE_FILE_NAME)),
        }
    }

    fn resolve(self, config_dir: &Path) -> ResolvedConfig {
        ResolvedConfig {
            cache_path: self.resolve_cache_path(config_dir),
            display_currency: self.display_currency,
            refresh: self.refresh,
            fx: self.fx,
            filter: self.filter,
            sources: self.sources,
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub cache_path: PathBuf,
    pub display_currency: String,
    pub refresh: RefreshConfig,
    pub fx: FxConfig,
    pub filter: FilterConfig,
    pub sources: SourcesConfig,
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Ok(Config::load(&config_path)?.resolve(config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Relative paths then resolve against the directory the config file
    /// would live in.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Ok(Config::default().resolve(config_dir))
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./wallet-holdings.toml` if it exists in current directory
/// 2. `~/.config/wallet-holdings/wallet-holdings.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("wallet-holdings.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("wallet-holdings").join("wallet-holdings.toml");
    }

    local_config
}
