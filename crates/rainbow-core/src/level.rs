//! Level parsing and the `LOGLEVEL` override.

use tracing_subscriber::filter::LevelFilter;

use crate::error::{RainbowError, Result};

/// Environment variable that overrides any level passed in code.
pub const LEVEL_ENV: &str = "LOGLEVEL";

/// Parse a level name (`debug`, `WARNING`, `critical`, ...) or a numeric
/// level on the 10/20/30/40/50 scale.
pub fn parse_level(value: &str) -> Result<LevelFilter> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Ok(match n {
            40.. => LevelFilter::ERROR,
            30..=39 => LevelFilter::WARN,
            20..=29 => LevelFilter::INFO,
            10..=19 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        });
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "trace" | "notset" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "critical" | "fatal" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(RainbowError::Level(value.to_string())),
    }
}

/// The level a logger ends up with: `env` (the `LOGLEVEL` value) when present,
/// `requested` otherwise.
pub fn resolve_level(requested: LevelFilter, env: Option<&str>) -> Result<LevelFilter> {
    match env {
        Some(value) => parse_level(value),
        None => Ok(requested),
    }
}

/// [`resolve_level`] against the live process environment.
pub fn level_from_env(requested: LevelFilter) -> Result<LevelFilter> {
    let env = std::env::var(LEVEL_ENV).ok();
    resolve_level(requested, env.as_deref())
}

pub(crate) mod serde_level {
    use serde::{Deserialize, Deserializer};
    use tracing_subscriber::filter::LevelFilter;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Number(u32),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name,
            Raw::Number(n) => n.to_string(),
        };
        super::parse_level(&text).map_err(serde::de::Error::custom)
    }
}
