//! Server settings.
//!
//! Resolution order, later entries winning:
//!
//! 1. Built-in defaults (`0.0.0.0:5500`)
//! 2. `PAYSTRAT_BIND` and `PORT` environment variables
//! 3. `--bind` / `--port` flags on `paystrat serve`

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5500;
pub const BIND_ENV: &str = "PAYSTRAT_BIND";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var} must be an IP address, got {value:?}")]
    InvalidBind { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            config.bind = raw.trim().parse().map_err(|_| ConfigError::InvalidBind {
                var: BIND_ENV,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            config.port = raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_ENV,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn with_overrides(mut self, bind: Option<IpAddr>, port: Option<u16>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
