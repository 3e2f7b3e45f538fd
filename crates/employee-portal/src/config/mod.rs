use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::subsidy::{PolicyTable, DEFAULT_COMBINED_CAP};

/// Deployment stage, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub subsidy: SubsidyConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));
        let server = ServerConfig {
            host: var_or("APP_HOST", "127.0.0.1"),
            port: parse_port(&var_or("APP_PORT", "3000"))?,
        };
        let telemetry = TelemetryConfig {
            log_level: var_or("APP_LOG_LEVEL", "info"),
        };
        let subsidy = SubsidyConfig {
            combined_cap: env::var("SUBSIDY_COMBINED_CAP")
                .ok()
                .map(|raw| parse_amount("SUBSIDY_COMBINED_CAP", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_COMBINED_CAP),
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            subsidy,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
        value: raw.to_string(),
    })
}

fn parse_amount(variable: &'static str, raw: &str) -> Result<Decimal, ConfigError> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|amount| !amount.is_sign_negative())
        .ok_or(ConfigError::InvalidAmount { variable })
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    host: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Fallback filter when `RUST_LOG` is unset.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Admin-configured subsidy limits layered over the static category policies.
#[derive(Debug, Clone)]
pub struct SubsidyConfig {
    pub combined_cap: Decimal,
}

impl SubsidyConfig {
    pub fn policy_table(&self) -> PolicyTable {
        PolicyTable::standard().with_combined_cap(self.combined_cap)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },
    InvalidAmount {
        variable: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{value}' is not a port number")
            }
            ConfigError::InvalidHost { host, .. } => {
                write!(f, "APP_HOST '{host}' is not an IP address or localhost")
            }
            ConfigError::InvalidAmount { variable } => {
                write!(f, "{variable} must be a non-negative decimal amount")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::InvalidAmount { .. } => None,
        }
    }
}
