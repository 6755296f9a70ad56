//! Runtime configuration from environment variables.
//!
//! `main` loads a `.env` file (if present) with `dotenvy` before calling
//! [`Config::from_env`], so both sources work.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::http::signer::redact;
use crate::network::Network;

pub const API_KEY: &str = "BINANCE_API_KEY";
pub const API_SECRET: &str = "BINANCE_API_SECRET";
pub const TESTNET: &str = "BINANCE_TESTNET";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FILE: &str = "LOG_FILE";
pub const RECV_WINDOW_MS: &str = "BINANCE_RECV_WINDOW_MS";
pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Upper bound the exchange accepts for `recvWindow`.
const MAX_RECV_WINDOW_MS: u64 = 60_000;

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub network: Network,
    /// A `tracing` level name: `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
    pub log_file: PathBuf,
    pub recv_window_ms: u64,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(ConfigError::Blank(key));
            }
            Ok(value)
        };
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = required(API_KEY)?;
        let api_secret = required(API_SECRET)?;

        let network = match optional(TESTNET) {
            None => Network::Testnet,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Network::Testnet,
                "false" | "0" | "no" => Network::Mainnet,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: TESTNET,
                        value: raw,
                        reason: "expected true/false, 1/0 or yes/no".into(),
                    })
                }
            },
        };

        let log_level = match optional(LOG_LEVEL) {
            None => "info".to_string(),
            Some(raw) => parse_log_level(&raw).ok_or_else(|| ConfigError::Invalid {
                key: LOG_LEVEL,
                value: raw.clone(),
                reason: "expected TRACE, DEBUG, INFO, WARNING or ERROR".into(),
            })?,
        };

        let log_file = optional(LOG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bot.log"));

        let recv_window_ms = parse_number(RECV_WINDOW_MS, optional(RECV_WINDOW_MS), 5_000)?;
        if recv_window_ms == 0 || recv_window_ms > MAX_RECV_WINDOW_MS {
            return Err(ConfigError::Invalid {
                key: RECV_WINDOW_MS,
                value: recv_window_ms.to_string(),
                reason: format!("must be between 1 and {}", MAX_RECV_WINDOW_MS),
            });
        }

        let timeout_secs = parse_number(HTTP_TIMEOUT_SECS, optional(HTTP_TIMEOUT_SECS), 30)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: HTTP_TIMEOUT_SECS,
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        Ok(Config {
            api_key,
            api_secret,
            network,
            log_level,
            log_file,
            recv_window_ms,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn futures_url(&self) -> &'static str {
        self.network.futures_url()
    }

    pub fn spot_url(&self) -> &'static str {
        self.network.spot_url()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &"***")
            .field("network", &self.network)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Accepts the level names people actually type, including `WARNING`.
fn parse_log_level(raw: &str) -> Option<String> {
    let level = match raw.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => return None,
    };
    Some(level.to_string())
}

fn parse_number(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
