//! Layered configuration.
//!
//! Values are merged in order, later layers winning:
//!
//! 1. built-in defaults,
//! 2. a TOML file (an explicit path, or `config.toml` in the platform config
//!    directory when it exists),
//! 3. environment variables prefixed with `PALDECK_`, with `__` separating
//!    nested keys (`PALDECK_FETCH__TTL_SECS=60`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use paldeck_extract::Site;
use paldeck_fetch::{FetchOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

pub const ENV_PREFIX: &str = "PALDECK_";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub api: ApiConfig,
}

/// Origins of the wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub origin: String,
    pub cdn_origin: String,
    pub locale: String,
    pub breeding_url_template: String,
}
impl Default for SiteConfig {
    fn default() -> Self {
        let Site { origin, cdn_origin, locale, breeding_url_template } = Site::default();
        Self { origin, cdn_origin, locale, breeding_url_template }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// How long fetched records stay fresh.
    pub ttl_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryConfig,
}
impl Default for FetchConfig {
    fn default() -> Self {
        let options = FetchOptions::default();
        Self {
            ttl_secs: options.ttl.as_secs(),
            timeout_secs: options.timeout.as_secs(),
            user_agent: options.user_agent,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}
impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.max_attempts,
            base_delay_ms: duration_millis(policy.base_delay),
            max_delay_ms: duration_millis(policy.max_delay),
        }
    }
}

/// The JSON-REST data provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Unset disables the JSON client.
    pub base_url: Option<String>,
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Loads defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist; the platform default is skipped when
    /// it does not.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file {} does not exist", path.display())));
            },
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        debug!(file = ?file, "loading configuration");
        Self::from_figment(Self::figment(file.as_deref()).merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Defaults merged with an optional TOML file, without the environment.
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(file) => figment.merge(Toml::file_exact(file)),
            None => figment,
        }
    }

    /// Extracts and validates a configuration from any provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [("site.origin", &self.site.origin), ("site.cdn_origin", &self.site.cdn_origin)] {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                exn::bail!(ErrorKind::Invalid(format!("{key} must be an http(s) origin, got {value:?}")));
            }
        }
        if self.site.locale.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("site.locale must not be empty".to_string()));
        }
        if self.fetch.retry.attempts == 0 {
            exn::bail!(ErrorKind::Invalid("fetch.retry.attempts must be at least 1".to_string()));
        }
        if self.fetch.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("fetch.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn site(&self) -> Site {
        Site {
            origin: self.site.origin.clone(),
            cdn_origin: self.site.cdn_origin.clone(),
            locale: self.site.locale.clone(),
            breeding_url_template: self.site.breeding_url_template.clone(),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let retry = &self.fetch.retry;
        FetchOptions {
            ttl: Duration::from_secs(self.fetch.ttl_secs),
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            user_agent: self.fetch.user_agent.clone(),
            retry: RetryPolicy {
                max_attempts: retry.attempts,
                base_delay: Duration::from_millis(retry.base_delay_ms),
                max_delay: Duration::from_millis(retry.max_delay_ms),
                // Each client picks its own curve and statuses.
                ..RetryPolicy::default()
            },
        }
    }
}

/// `config.toml` in the platform configuration directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "paldeck").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
