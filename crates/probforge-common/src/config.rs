use serde::{Deserialize, Serialize};
use url::Url;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Language used for labels and status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" => Ok(Locale::Ja),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale {other:?}, expected `ja` or `en`")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::Ja => "ja",
            Locale::En => "en",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the problem backend.
    pub endpoint: Url,
    /// Per-request timeout in seconds. Generation can be slow.
    pub timeout_secs: u64,
    /// UI language.
    pub locale: Locale,
}

impl Config {
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:8000";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub const ENDPOINT_VAR: &'static str = "PROBFORGE_ENDPOINT";
    pub const TIMEOUT_VAR: &'static str = "PROBFORGE_TIMEOUT_SECS";
    pub const LOCALE_VAR: &'static str = "PROBFORGE_LOCALE";

    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, ConfigError> {
        loader.load().await
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply overrides from the process environment.
    ///
    /// - `PROBFORGE_ENDPOINT`: backend base URL
    /// - `PROBFORGE_TIMEOUT_SECS`: request timeout
    /// - `PROBFORGE_LOCALE`: `ja` or `en`
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(Self::ENDPOINT_VAR) {
            self.endpoint = parse_endpoint(&url)?;
        }
        if let Some(secs) = lookup(Self::TIMEOUT_VAR) {
            self.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: Self::TIMEOUT_VAR,
                value: secs.clone(),
            })?;
        }
        if let Some(locale) = lookup(Self::LOCALE_VAR) {
            self.locale = locale.parse().map_err(|_| ConfigError::InvalidEnv {
                var: Self::LOCALE_VAR,
                value: locale.clone(),
            })?;
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(Self::DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            locale: Locale::default(),
        }
    }
}

/// Parse a backend base URL, rejecting anything that is not http(s).
pub fn parse_endpoint(url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        url: url.to_owned(),
        message: e.to_string(),
    })?;
    check_scheme(parsed)
}

fn check_scheme(url: Url) -> Result<Url, ConfigError> {
    if matches!(url.scheme(), "http" | "https") {
        return Ok(url);
    }
    Err(ConfigError::InvalidEndpoint {
        message: format!("unsupported scheme {}", url.scheme()),
        url: url.into(),
    })
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<Config, ConfigError>> + Send;
}

/// A [`Loader`] that reads a configuration file.
///
/// The format is picked from the file extension: `.json` or `.toml`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Config, ConfigError> {
        let read = || {
            std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })
        };
        let mut config: Config = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&read()?).map_err(|source| ConfigError::Json {
                path: self.path.clone(),
                source,
            })?,
            Some("toml") => toml::from_str(&read()?).map_err(|source| ConfigError::Toml {
                path: self.path.clone(),
                source,
            })?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: self.path.clone(),
                });
            }
        };
        config.endpoint = check_scheme(config.endpoint)?;
        Ok(config)
    }
}
