//! Server configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags. Every field has a default, so an empty file is valid.

use crate::errors::{ConfigurationError, DiagflowError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8787;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigurationError::Invalid(format!(
                "unknown log format '{other}', expected 'pretty' or 'json'"
            ))),
        }
    }
}

fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Top-level configuration of the `diagflow` server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// JSON file of problem definitions. No problems are served when unset.
    #[serde(default)]
    pub problems_path: Option<PathBuf>,
    /// Upper bound on a single tool invocation, in milliseconds.
    #[serde(default)]
    pub dispatch_timeout_ms: Option<u64>,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_PORT,
            problems_path: None,
            dispatch_timeout_ms: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DiagflowError::ConfigParse`] for malformed TOML or unknown
    /// keys, and [`DiagflowError::Configuration`] for invalid values.
    pub fn from_toml_str(toml: &str) -> Result<Self, DiagflowError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_toml_str`]; I/O failures are returned as
    /// [`DiagflowError::Io`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DiagflowError> {
        let toml = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml)
    }

    /// Checks value constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.dispatch_timeout_ms == Some(0) {
            return Err(ConfigurationError::Invalid(
                "dispatch_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the socket address to listen on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Returns the dispatch timeout, if configured.
    #[must_use]
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.dispatch_timeout_ms.map(Duration::from_millis)
    }
}
