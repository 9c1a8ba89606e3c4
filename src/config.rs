use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::bridge::framer::Framing;
use crate::bridge::policy::{BoundedRetry, FailFast, ReadErrorPolicy};
use crate::error::ConfigError;
use crate::transport::serial::{SerialSettings, DEFAULT_BAUD_RATE};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub serial: SerialSettings,
    pub listen_addr: SocketAddr,
    pub framing: Framing,
    pub max_pending: Option<usize>,
    pub read_retries: u32,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("SERIAL_PORT")
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::Missing("SERIAL_PORT"))?;

        let baud_rate = parse_or("BAUD_RATE", &lookup, DEFAULT_BAUD_RATE)?;
        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => parse("LISTEN_ADDR", &raw)?,
            None => parse("LISTEN_ADDR", DEFAULT_LISTEN_ADDR)?,
        };

        let framing = match lookup("FRAMING").as_deref() {
            None | Some("delimited") => Framing::default(),
            Some("chunk") => Framing::ChunkPerRecord,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "FRAMING",
                    value: other.to_string(),
                    reason: "expected 'delimited' or 'chunk'".to_string(),
                })
            }
        };

        let max_pending = match lookup("MAX_PENDING") {
            Some(raw) => Some(parse::<usize>("MAX_PENDING", &raw)?),
            None => None,
        };
        let read_retries = parse_or("READ_RETRIES", &lookup, 0)?;

        Ok(Self {
            serial: SerialSettings { path, baud_rate },
            listen_addr,
            framing,
            max_pending,
            read_retries,
        })
    }

    /// Fails fast unless retries were asked for.
    pub fn read_policy(&self) -> Box<dyn ReadErrorPolicy> {
        match self.read_retries {
            0 => Box::new(FailFast),
            n => Box::new(BoundedRetry::new(n, RETRY_BACKOFF)),
        }
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, F>(var: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => parse(var, &raw),
        None => Ok(default),
    }
}
