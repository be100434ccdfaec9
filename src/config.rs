use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

use crate::bracket::PollConfig;
use crate::scoring::DEFAULT_HANTEI_JUDGES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("KUMITE_PORT must be a valid u16")]
    InvalidPort,

    #[error("KUMITE_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[source] std::net::AddrParseError),

    #[error("KUMITE_POLL_INTERVAL_MS must be a positive number of milliseconds")]
    InvalidPollInterval,

    #[error("KUMITE_HANTEI_JUDGES must be an odd number of at least 1")]
    InvalidJudgeCount,
}

/// Top-level configuration for the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    /// Selects the PostgreSQL match store when set
    pub database_url: Option<String>,
    pub poll: PollConfig,
    pub hantei_judges: usize,
    /// Judge shown as the recorder of finalized results
    pub judge_id: Option<String>,
}

impl AppConfig {
    /// Reads the process environment, after loading a `.env` file if present
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("KUMITE_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("KUMITE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 3000,
        };
        let log_filter =
            lookup("KUMITE_LOG").unwrap_or_else(|| "kumite=debug,tower_http=debug".to_string());
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let poll = match lookup("KUMITE_POLL_INTERVAL_MS") {
            Some(raw) => {
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or(ConfigError::InvalidPollInterval)?;
                PollConfig {
                    poll_interval: Duration::from_millis(millis),
                }
            }
            None => PollConfig::default(),
        };

        let hantei_judges = match lookup("KUMITE_HANTEI_JUDGES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| n % 2 == 1)
                .ok_or(ConfigError::InvalidJudgeCount)?,
            None => DEFAULT_HANTEI_JUDGES,
        };

        let judge_id = lookup("KUMITE_JUDGE_ID").filter(|id| !id.trim().is_empty());

        Ok(Self {
            host,
            port,
            log_filter,
            database_url,
            poll,
            hantei_judges,
            judge_id,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(ConfigError::InvalidHost)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
