//! Server configuration.
//!
//! Loaded once at startup from a TOML file, then overridden by
//! environment variables:
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [[authorized_users]]
//! username = "admin"
//! password = "changeme"
//! ```
//!
//! | Variable       | Field  |
//! |----------------|--------|
//! | `MONOCLE_HOST` | `host` |
//! | `MONOCLE_PORT` | `port` |

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use monocle_session::{Credential, CredentialStore};
use serde::Deserialize;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `host` must be a literal IP address, not a hostname.
    #[error("invalid host {0:?}: expected an IP address")]
    InvalidHost(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Everything the server reads at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonocleConfig {
    /// IP address to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Users allowed to log in, in match order.
    #[serde(default)]
    pub authorized_users: Vec<Credential>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for MonocleConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            authorized_users: Vec::new(),
        }
    }
}

impl MonocleConfig {
    /// Loads configuration from `path` and applies environment overrides.
    ///
    /// A missing file is not an error: defaults are used and a warning
    /// is logged. A file that exists but does not parse is an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok()).await
    }

    /// [`load`](Self::load), with overrides read through `lookup`
    /// instead of the process environment.
    pub async fn load_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "config file not found, using defaults"
                );
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        config.apply_overrides(lookup)?;
        config.bind_addr()?;

        if config.authorized_users.is_empty() {
            tracing::warn!("no authorized users configured, every login will fail");
        }
        Ok(config)
    }

    /// Parses configuration from TOML text. No overrides are applied.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `MONOCLE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MONOCLE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("MONOCLE_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MONOCLE_PORT",
                value: port,
            })?;
        }
        Ok(())
    }

    /// The socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Builds the read-only credential store for this configuration.
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.authorized_users.iter().cloned())
    }
}
