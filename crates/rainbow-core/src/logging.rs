//! One-call process logging setup.
//!
//! Provides:
//! - Console output (colorized when `use_color`, detailed layout otherwise)
//! - File output (daily rotation via `tracing-appender`) when a log directory
//!   is given
//! - Level from an explicit parameter, overridden by `LOGLEVEL`

use std::collections::BTreeMap;
use std::path::Path;

use tracing_subscriber::filter::LevelFilter;

use crate::config::{FormatterConfig, HandlerConfig, LoggerEntry, LoggingConfig, RotationKind, StreamTarget, ROOT};
use crate::error::Result;
use crate::factory::{get_config_logger, Logger};
use crate::level::{level_from_env, parse_level};
use crate::pattern::DETAILED_FORMAT;

/// Build the config behind [`init_logging`]: a stdout handler and, with
/// `log_dir`, a daily-rotating `<module_name>.log` in that directory.
pub fn console_file_config(use_color: bool, log_dir: Option<&Path>, module_name: &str) -> LoggingConfig {
    let mut formatters = BTreeMap::from([(
        "detailed".to_string(),
        FormatterConfig { format: Some(DETAILED_FORMAT.to_string()), ..Default::default() },
    )]);
    let console_formatter = if use_color {
        formatters.insert("rainbow".to_string(), FormatterConfig { colorize: true, ..Default::default() });
        "rainbow"
    } else {
        "detailed"
    };

    let mut handlers = BTreeMap::from([(
        "console".to_string(),
        HandlerConfig::Stream {
            level: LevelFilter::TRACE,
            formatter: Some(console_formatter.to_string()),
            stream: StreamTarget::Stdout,
        },
    )]);
    if let Some(dir) = log_dir {
        handlers.insert(
            "file".to_string(),
            HandlerConfig::RotatingFile {
                level: LevelFilter::TRACE,
                formatter: Some("detailed".to_string()),
                filename: dir.join(format!("{module_name}.log")),
                rotation: RotationKind::Daily,
                backup_count: None,
            },
        );
    }

    let loggers = BTreeMap::from([(
        ROOT.to_string(),
        LoggerEntry { level: LevelFilter::TRACE, handlers: handlers.keys().cloned().collect() },
    )]);
    LoggingConfig { version: 1, disable_existing_loggers: false, formatters, handlers, loggers }
}

/// Build a logger for `module_name` without installing it.
pub fn build_logging(log_level: &str, log_dir: Option<&Path>, module_name: &str, use_color: bool) -> Result<Logger> {
    let level = level_from_env(parse_level(log_level)?)?;
    let config = console_file_config(use_color, log_dir, module_name);
    let logger = get_config_logger(module_name, &config)?;
    logger.set_level(level)?;
    Ok(logger)
}

/// Initialize the global `tracing` dispatcher.
///
/// Should be called once at program start. After this, all `tracing::info!()`
/// etc. macros go through the returned logger.
///
/// # Parameters
///
/// - `log_level`: level name or number (e.g. `"info"`), unless `LOGLEVEL` is set
/// - `log_dir`: optional directory for daily-rotating log files
/// - `module_name`: logger name and log file prefix (e.g. `"sync"`)
/// - `use_color`: colorized console output
pub fn init_logging(log_level: &str, log_dir: Option<&Path>, module_name: &str, use_color: bool) -> Result<Logger> {
    let logger = build_logging(log_level, log_dir, module_name, use_color)?;
    logger.init_global()?;
    Ok(logger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_only() {
        let config = console_file_config(false, None, "svc");
        config.validate().unwrap();
        assert_eq!(config.entry_for("svc").unwrap().handlers, vec!["console"]);
        assert_eq!(config.handlers["console"].formatter(), Some("detailed"));
    }

    #[test]
    fn color_console_with_file() {
        let config = console_file_config(true, Some(Path::new("/var/log/svc")), "svc");
        config.validate().unwrap();
        assert_eq!(config.handlers["console"].formatter(), Some("rainbow"));
        match &config.handlers["file"] {
            HandlerConfig::RotatingFile { filename, rotation, .. } => {
                assert_eq!(filename, Path::new("/var/log/svc/svc.log"));
                assert_eq!(*rotation, RotationKind::Daily);
            }
            other => panic!("unexpected handler {other:?}"),
        }
        assert_eq!(config.entry_for("svc").unwrap().handlers, vec!["console", "file"]);
    }

    #[test]
    fn build_rejects_bad_level() {
        assert!(build_logging("chatty", None, "logging-bad-level", false).is_err());
    }

    #[test]
    fn build_applies_level() {
        let dir = tempfile::tempdir().unwrap();
        let logger = build_logging("warning", Some(dir.path()), "logging-build", false).unwrap();
        if std::env::var(crate::level::LEVEL_ENV).is_err() {
            assert_eq!(logger.level(), LevelFilter::WARN);
        }
        logger.in_scope(|| tracing::error!("written"));
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
