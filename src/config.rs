//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `CHAT_RELAY_HOST` | `0.0.0.0` |
//! | `CHAT_RELAY_PORT` | `8080` |
//! | `CHAT_RELAY_PING_INTERVAL_SECS` | `30` (`0` disables pings) |
//! | `CHAT_RELAY_PONG_TIMEOUT_SECS` | `10` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PONG_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub ping_interval_secs: u64,
    /// How long a ping may stay unanswered before the connection is dropped
    pub pong_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ping_interval_secs: DEFAULT_PING_INTERVAL_SECS,
            pong_timeout_secs: DEFAULT_PONG_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("CHAT_RELAY_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);

        Self {
            host,
            port: parse_or_default(&lookup, "CHAT_RELAY_PORT", defaults.port),
            ping_interval_secs: parse_or_default(
                &lookup,
                "CHAT_RELAY_PING_INTERVAL_SECS",
                defaults.ping_interval_secs,
            ),
            pong_timeout_secs: parse_or_default(
                &lookup,
                "CHAT_RELAY_PONG_TIMEOUT_SECS",
                defaults.pong_timeout_secs,
            ),
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Interval between liveness pings, `None` when disabled
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }

    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(self.pong_timeout_secs)
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
                default
            }
        },
    }
}
