//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_POOLED;

/// Default total cache budget: 64 MiB
const DEFAULT_MAX_SIZE: u64 = 64 * 1024 * 1024;

/// Default idle expiry in seconds (one hour)
const DEFAULT_EXPIRY_SECS: u64 = 60 * 60;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Total cache budget in bytes; the per-entry cap is a tenth of it
    pub max_size: u64,
    /// Idle expiry in seconds, 0 disables expiry
    pub expiry_secs: u64,
    /// Idle buffers kept by the buffer pool
    pub pool_buffers: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `OBJCACHE_MAX_SIZE` - Total budget in bytes (default: 64 MiB)
    /// - `OBJCACHE_EXPIRY_SECS` - Idle expiry in seconds, 0 = never (default: 3600)
    /// - `OBJCACHE_POOL_BUFFERS` - Pooled idle buffers (default: 64)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env_or("OBJCACHE_MAX_SIZE", defaults.max_size),
            expiry_secs: env_or("OBJCACHE_EXPIRY_SECS", defaults.expiry_secs),
            pool_buffers: env_or("OBJCACHE_POOL_BUFFERS", defaults.pool_buffers),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            expiry_secs: DEFAULT_EXPIRY_SECS,
            pool_buffers: DEFAULT_MAX_POOLED,
            server_port: 3000,
        }
    }
}

/// Parses `name` from the environment, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
