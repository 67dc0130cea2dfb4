use std::env;
use std::net::SocketAddr;

use chrono::Datelike;
use thiserror::Error;

use crate::core::{ReinvestmentPolicy, SUPPORTED_START_YEARS};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub log_json: bool,
    /// Pinned calendar year; `None` follows the local clock.
    pub current_year: Option<i32>,
    pub reinvestment: ReinvestmentPolicy,
    pub history_default_limit: usize,
    pub history_max_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_json: false,
            current_year: None,
            reinvestment: ReinvestmentPolicy::ContributionsOnly,
            history_default_limit: DEFAULT_HISTORY_LIMIT,
            history_max_limit: MAX_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("ROADMAP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                name: "ROADMAP_BIND",
                value: bind_raw.clone(),
                reason: "expected host:port",
            })?;

        let config = Self {
            bind,
            log_json: parse_bool(&lookup, "ROADMAP_LOG_JSON", false)?,
            current_year: parse_optional::<i32, _>(&lookup, "ROADMAP_CURRENT_YEAR")?,
            reinvestment: parse_reinvestment(&lookup)?,
            history_default_limit: parse_optional(&lookup, "ROADMAP_HISTORY_DEFAULT_LIMIT")?
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
            history_max_limit: parse_optional(&lookup, "ROADMAP_HISTORY_MAX_LIMIT")?
                .unwrap_or(MAX_HISTORY_LIMIT),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.bind.set_port(port);
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(year) = self.current_year {
            if !SUPPORTED_START_YEARS.contains(&year) {
                return Err(ConfigError::InvalidValue {
                    name: "ROADMAP_CURRENT_YEAR",
                    value: year.to_string(),
                    reason: "must be between 1900 and 9999",
                });
            }
        }
        if self.history_max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ROADMAP_HISTORY_MAX_LIMIT",
                value: self.history_max_limit.to_string(),
                reason: "must be > 0",
            });
        }
        if self.history_default_limit == 0 || self.history_default_limit > self.history_max_limit
        {
            return Err(ConfigError::InvalidValue {
                name: "ROADMAP_HISTORY_DEFAULT_LIMIT",
                value: self.history_default_limit.to_string(),
                reason: "must be between 1 and ROADMAP_HISTORY_MAX_LIMIT",
            });
        }
        Ok(())
    }
}

fn parse_bool<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "yes" | "YES") => Ok(true),
        Some("0" | "false" | "FALSE" | "no" | "NO") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue {
            name,
            value: other.to_string(),
            reason: "expected a boolean",
        }),
    }
}

fn parse_optional<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name,
                value: raw,
                reason: "not a number",
            }),
    }
}

fn parse_reinvestment<F>(lookup: &F) -> Result<ReinvestmentPolicy, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("ROADMAP_REINVESTMENT").as_deref() {
        None | Some("contributions-only") => Ok(ReinvestmentPolicy::ContributionsOnly),
        Some("compound") => Ok(ReinvestmentPolicy::Compound),
        Some(other) => Err(ConfigError::InvalidValue {
            name: "ROADMAP_REINVESTMENT",
            value: other.to_string(),
            reason: "expected contributions-only or compound",
        }),
    }
}
