//! Dictionary-style logging configuration.
//!
//! A config document declares named formatters, named handlers that reference
//! them, and logger entries that pick handlers and a level. The entry keyed by
//! the exact logger name wins; the root entry (`""`) covers everything else.
//!
//! # Example config
//!
//! ```json
//! {
//!   "version": 1,
//!   "formatters": { "detailed": { "format": "{asctime} - {name} - {levelname} - {message}" } },
//!   "handlers": {
//!     "console": { "class": "stream", "level": "INFO", "formatter": "detailed", "stream": "stdout" },
//!     "file": { "class": "rotating_file", "level": "INFO", "formatter": "detailed",
//!               "filename": "/tmp/junk.log", "rotation": "daily", "backup_count": 5 }
//!   },
//!   "loggers": { "": { "level": "DEBUG", "handlers": ["console"] } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::LevelFilter;

use crate::error::{RainbowError, Result};
use crate::level::serde_level;
use crate::pattern::{DETAILED_FORMAT, EMAIL_FORMAT};

/// Key of the root logger entry.
pub const ROOT: &str = "";

/// Top-level logging config, deserialized from a JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Schema version. Only `1` is understood.
    pub version: u32,

    /// Switch off every logger built before this config was applied.
    #[serde(default)]
    pub disable_existing_loggers: bool,

    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterConfig>,

    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,

    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerEntry>,
}

/// A named formatter: either a plain template or the colorizing formatter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatterConfig {
    /// Template with `{placeholder}` fields. Defaults to `{message}`.
    pub format: Option<String>,

    /// chrono format string for `{asctime}`.
    pub datefmt: Option<String>,

    /// Use the colorizing formatter; `format` and `datefmt` are ignored.
    #[serde(default)]
    pub colorize: bool,
}

/// Output stream of a stream handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget {
    Stdout,
    #[default]
    Stderr,
}

/// When a rotating file handler starts a new file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationKind {
    Minutely,
    Hourly,
    Daily,
    #[default]
    Never,
}

impl RotationKind {
    pub fn to_rotation(self) -> Rotation {
        match self {
            RotationKind::Minutely => Rotation::MINUTELY,
            RotationKind::Hourly => Rotation::HOURLY,
            RotationKind::Daily => Rotation::DAILY,
            RotationKind::Never => Rotation::NEVER,
        }
    }
}

/// A named handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum HandlerConfig {
    Stream {
        #[serde(default = "trace_level", deserialize_with = "serde_level::deserialize")]
        level: LevelFilter,
        formatter: Option<String>,
        #[serde(default)]
        stream: StreamTarget,
    },
    RotatingFile {
        #[serde(default = "trace_level", deserialize_with = "serde_level::deserialize")]
        level: LevelFilter,
        formatter: Option<String>,
        filename: PathBuf,
        #[serde(default)]
        rotation: RotationKind,
        /// Number of rotated files kept on disk.
        backup_count: Option<usize>,
    },
}

impl HandlerConfig {
    pub fn level(&self) -> LevelFilter {
        match self {
            HandlerConfig::Stream { level, .. } | HandlerConfig::RotatingFile { level, .. } => *level,
        }
    }

    pub fn formatter(&self) -> Option<&str> {
        match self {
            HandlerConfig::Stream { formatter, .. } | HandlerConfig::RotatingFile { formatter, .. } => {
                formatter.as_deref()
            }
        }
    }
}

/// Level and handlers for one logger name (or the root).
#[derive(Debug, Clone, Deserialize)]
pub struct LoggerEntry {
    #[serde(default = "trace_level", deserialize_with = "serde_level::deserialize")]
    pub level: LevelFilter,

    #[serde(default)]
    pub handlers: Vec<String>,
}

fn trace_level() -> LevelFilter {
    LevelFilter::TRACE
}

impl LoggingConfig {
    /// Check version and cross references.
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RainbowError::Config(format!("unsupported config version {}", self.version)));
        }
        for (name, handler) in &self.handlers {
            if let Some(formatter) = handler.formatter() {
                if !self.formatters.contains_key(formatter) {
                    return Err(RainbowError::Config(format!(
                        "handler {name:?} uses unknown formatter {formatter:?}"
                    )));
                }
            }
        }
        for (name, entry) in &self.loggers {
            for handler in &entry.handlers {
                if !self.handlers.contains_key(handler) {
                    return Err(RainbowError::Config(format!(
                        "logger {name:?} uses unknown handler {handler:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The entry that applies to `name`: its own, else the root's.
    pub fn entry_for(&self, name: &str) -> Result<&LoggerEntry> {
        self.loggers
            .get(name)
            .or_else(|| self.loggers.get(ROOT))
            .ok_or_else(|| RainbowError::Config(format!("no logger entry for {name:?} and no root entry")))
    }
}

impl Default for LoggingConfig {
    /// Console at INFO on stdout with the detailed layout, root at DEBUG. A
    /// rotating file handler is declared for loggers that opt into it.
    fn default() -> Self {
        let formatters = BTreeMap::from([
            (
                "detailed".to_string(),
                FormatterConfig { format: Some(DETAILED_FORMAT.to_string()), ..Default::default() },
            ),
            (
                "email".to_string(),
                FormatterConfig { format: Some(EMAIL_FORMAT.to_string()), ..Default::default() },
            ),
        ]);
        let handlers = BTreeMap::from([
            (
                "console".to_string(),
                HandlerConfig::Stream {
                    level: LevelFilter::INFO,
                    formatter: Some("detailed".to_string()),
                    stream: StreamTarget::Stdout,
                },
            ),
            (
                "file".to_string(),
                HandlerConfig::RotatingFile {
                    level: LevelFilter::INFO,
                    formatter: Some("detailed".to_string()),
                    filename: PathBuf::from("/tmp/junk.log"),
                    rotation: RotationKind::Daily,
                    backup_count: Some(5),
                },
            ),
        ]);
        let loggers = BTreeMap::from([(
            ROOT.to_string(),
            LoggerEntry { level: LevelFilter::DEBUG, handlers: vec!["console".to_string()] },
        )]);
        Self { version: 1, disable_existing_loggers: false, formatters, handlers, loggers }
    }
}

/// Parse and validate a JSON config document.
pub fn parse_config(json: &str) -> Result<LoggingConfig> {
    let config: LoggingConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a JSON config file.
pub fn load_config(path: &Path) -> Result<LoggingConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
