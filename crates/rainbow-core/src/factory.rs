//! Logger factory.
//!
//! A [`Logger`] is a named `tracing` dispatcher: a registry with a reloadable
//! level filter in front of one formatting layer per handler. Color and plain
//! loggers are cached by display name so asking twice never attaches a second
//! handler; configured loggers re-apply their config on every call.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::Dispatch;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{DefaultFields, FormatEvent};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{reload, Layer, Registry};

use crate::config::{FormatterConfig, HandlerConfig, LoggingConfig, RotationKind, StreamTarget};
use crate::error::{RainbowError, Result};
use crate::formatter::RainbowFormatter;
use crate::level::level_from_env;
use crate::name::{invoking_program, modify_name};
use crate::pattern::PatternFormatter;

type Base = Layered<reload::Layer<LevelFilter, Registry>, Registry>;
type HandlerLayer = Box<dyn Layer<Base> + Send + Sync>;

/// How a logger was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerKind {
    Color,
    Plain,
    Config,
}

/// Named, cloneable handle to a configured dispatcher.
#[derive(Clone)]
pub struct Logger {
    name: String,
    kind: LoggerKind,
    dispatch: Dispatch,
    level: reload::Handle<LevelFilter, Registry>,
}

impl Logger {
    fn assemble(name: &str, kind: LoggerKind, level: LevelFilter, handlers: Vec<HandlerLayer>) -> Self {
        let (filter, handle) = reload::Layer::new(level);
        let subscriber = tracing_subscriber::registry().with(filter).with(handlers);
        Self {
            name: name.to_string(),
            kind,
            dispatch: Dispatch::new(subscriber),
            level: handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LoggerKind {
        self.kind
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn level(&self) -> LevelFilter {
        self.level.clone_current().unwrap_or(LevelFilter::OFF)
    }

    pub fn set_level(&self, level: LevelFilter) -> Result<()> {
        self.level.reload(level)?;
        Ok(())
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Install as the process-wide default. Fails if one is already set.
    pub fn init_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("level", &self.level())
            .finish()
    }
}

/// Options for [`get_logger`].
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub use_color: bool,
    pub level: LevelFilter,
    /// Shorten display names longer than 40 characters.
    pub shorten: bool,
    /// Config for non-color loggers; the built-in default when `None`.
    pub config: Option<LoggingConfig>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self { use_color: false, level: LevelFilter::INFO, shorten: false, config: None }
    }
}

fn cache() -> &'static Mutex<HashMap<String, Logger>> {
    static LOGGERS: OnceLock<Mutex<HashMap<String, Logger>>> = OnceLock::new();
    LOGGERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Return the cached color or plain logger for `name`, building one when the
/// name is new or only has a configured logger.
fn cached_or_insert(name: &str, build: impl FnOnce() -> Logger) -> Logger {
    let mut loggers = cache().lock().unwrap_or_else(PoisonError::into_inner);
    match loggers.get(name) {
        Some(existing) if existing.kind != LoggerKind::Config => existing.clone(),
        _ => {
            let logger = build();
            loggers.insert(name.to_string(), logger.clone());
            logger
        }
    }
}

fn boxed<F, W>(format: F, writer: W, ansi: bool, level: LevelFilter) -> HandlerLayer
where
    F: FormatEvent<Base, DefaultFields> + Send + Sync + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer)
        .event_format(format)
        .with_filter(level)
        .boxed()
}

fn stream_layer<F>(format: F, stream: StreamTarget, level: LevelFilter) -> HandlerLayer
where
    F: FormatEvent<Base, DefaultFields> + Send + Sync + 'static,
{
    match stream {
        StreamTarget::Stdout => boxed(format, std::io::stdout, std::io::stdout().is_terminal(), level),
        StreamTarget::Stderr => boxed(format, std::io::stderr, std::io::stderr().is_terminal(), level),
    }
}

/// Colorizing formatter on stdout. Escape codes are only written when stdout
/// is a terminal.
pub fn get_color_logger(name: &str) -> Logger {
    cached_or_insert(name, || {
        let handler = stream_layer(RainbowFormatter::new(name), StreamTarget::Stdout, LevelFilter::TRACE);
        Logger::assemble(name, LoggerKind::Color, LevelFilter::INFO, vec![handler])
    })
}

/// Detailed plain layout on stdout.
pub fn get_default_logger(name: &str) -> Logger {
    cached_or_insert(name, || {
        let handler = stream_layer(PatternFormatter::detailed(name), StreamTarget::Stdout, LevelFilter::TRACE);
        Logger::assemble(name, LoggerKind::Plain, LevelFilter::INFO, vec![handler])
    })
}

/// Split `/var/log/app.log` into directory, prefix and suffix for the appender.
fn appender_parts(filename: &Path) -> Result<(&Path, String, Option<String>)> {
    let dir = filename.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let prefix = filename
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| RainbowError::Config(format!("log file {} has no file name", filename.display())))?;
    let suffix = filename.extension().map(|s| s.to_string_lossy().into_owned());
    Ok((dir, prefix, suffix))
}

fn file_appender(filename: &Path, rotation: RotationKind, backup_count: Option<usize>) -> Result<RollingFileAppender> {
    let (dir, prefix, suffix) = appender_parts(filename)?;
    let mut builder = RollingFileAppender::builder()
        .rotation(rotation.to_rotation())
        .filename_prefix(prefix);
    if let Some(suffix) = suffix {
        builder = builder.filename_suffix(suffix);
    }
    if let Some(count) = backup_count {
        builder = builder.max_log_files(count);
    }
    Ok(builder.build(dir)?)
}

fn attach<F>(format: F, handler: &HandlerConfig) -> Result<HandlerLayer>
where
    F: FormatEvent<Base, DefaultFields> + Send + Sync + 'static,
{
    match handler {
        HandlerConfig::Stream { level, stream, .. } => Ok(stream_layer(format, *stream, *level)),
        HandlerConfig::RotatingFile { level, filename, rotation, backup_count, .. } => {
            let appender = file_appender(filename, *rotation, *backup_count)?;
            Ok(boxed(format, appender, false, *level))
        }
    }
}

fn handler_layer(name: &str, handler: &HandlerConfig, formatter: &FormatterConfig) -> Result<HandlerLayer> {
    if formatter.colorize {
        return attach(RainbowFormatter::new(name), handler);
    }
    let template = formatter.format.as_deref().unwrap_or("{message}");
    let mut format = PatternFormatter::new(name, template)?;
    if let Some(datefmt) = &formatter.datefmt {
        format = format.datefmt(datefmt.clone());
    }
    attach(format, handler)
}

/// Switch off every logger that is neither `keep` nor named in `config`.
fn disable_others(loggers: &HashMap<String, Logger>, keep: &str, config: &LoggingConfig) -> Result<()> {
    for (name, logger) in loggers {
        if name != keep && !config.loggers.contains_key(name) {
            logger.set_level(LevelFilter::OFF)?;
        }
    }
    Ok(())
}

/// Build a logger from a config document. The matching entry's handlers are
/// attached in order, each behind its own level filter. The result replaces
/// any cached logger of the same name.
pub fn get_config_logger(name: &str, config: &LoggingConfig) -> Result<Logger> {
    config.validate()?;
    let entry = config.entry_for(name)?;

    let mut handlers = Vec::with_capacity(entry.handlers.len());
    for handler_name in &entry.handlers {
        let handler = config
            .handlers
            .get(handler_name)
            .ok_or_else(|| RainbowError::Config(format!("unknown handler {handler_name:?}")))?;
        let formatter = match handler.formatter() {
            Some(key) => config.formatters.get(key).cloned().unwrap_or_default(),
            None => FormatterConfig::default(),
        };
        handlers.push(handler_layer(name, handler, &formatter)?);
    }

    let logger = Logger::assemble(name, LoggerKind::Config, entry.level, handlers);

    let mut loggers = cache().lock().unwrap_or_else(PoisonError::into_inner);
    if config.disable_existing_loggers {
        disable_others(&loggers, name, config)?;
    }
    loggers.insert(name.to_string(), logger.clone());
    Ok(logger)
}

/// The colorizing logger when `use_color`, otherwise a configured one.
pub fn choose_logger(name: &str, use_color: bool, config: Option<&LoggingConfig>) -> Result<Logger> {
    if use_color {
        return Ok(get_color_logger(name));
    }
    match config {
        Some(config) => get_config_logger(name, config),
        None => get_config_logger(name, &LoggingConfig::default()),
    }
}

/// Derive the display name, pick the logger and apply the level. `LOGLEVEL`
/// in the environment overrides `options.level`.
pub fn get_logger(name: &str, options: &LoggerOptions) -> Result<Logger> {
    let program = invoking_program();
    let name = modify_name(name, program.as_deref(), options.shorten);
    let logger = choose_logger(&name, options.use_color, options.config.as_ref())?;
    logger.set_level(level_from_env(options.level)?)?;
    tracing::debug!(logger = %logger.name(), kind = ?logger.kind(), level = %logger.level(), "logger ready");
    Ok(logger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn file_config(dir: &Path, level: &str) -> LoggingConfig {
        let json = format!(
            r#"{{
                "version": 1,
                "formatters": {{ "short": {{ "format": "{{levelname}}|{{name}}|{{message}}" }} }},
                "handlers": {{
                    "file": {{ "class": "rotating_file", "level": "{level}", "formatter": "short",
                               "filename": "{}" }}
                }},
                "loggers": {{ "": {{ "level": "TRACE", "handlers": ["file"] }} }}
            }}"#,
            dir.join("app.log").display()
        );
        parse_config(&json).unwrap()
    }

    fn read_log(dir: &Path) -> String {
        std::fs::read_to_string(dir.join("app.log")).unwrap_or_default()
    }

    #[test]
    fn color_logger_is_cached() {
        let a = get_color_logger("factory-cache-test");
        let b = get_color_logger("factory-cache-test");
        assert_eq!(a.kind(), LoggerKind::Color);
        a.set_level(LevelFilter::ERROR).unwrap();
        assert_eq!(b.level(), LevelFilter::ERROR);
    }

    #[test]
    fn cached_name_keeps_first_kind() {
        let first = get_default_logger("factory-kind-test");
        let second = get_color_logger("factory-kind-test");
        assert_eq!(first.kind(), LoggerKind::Plain);
        assert_eq!(second.kind(), LoggerKind::Plain);
    }

    #[test]
    fn config_logger_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = get_config_logger("factory-file", &file_config(dir.path(), "INFO")).unwrap();
        assert_eq!(logger.kind(), LoggerKind::Config);
        logger.in_scope(|| {
            tracing::debug!("hidden by handler");
            tracing::info!("kept");
            tracing::warn!(code = 7, "also kept");
        });
        assert_eq!(read_log(dir.path()), "INFO|factory-file|kept\nWARNING|factory-file|also kept code=7\n");
    }

    #[test]
    fn logger_level_filters_before_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let logger = get_config_logger("factory-level", &file_config(dir.path(), "TRACE")).unwrap();
        logger.set_level(LevelFilter::WARN).unwrap();
        assert_eq!(logger.level(), LevelFilter::WARN);
        logger.in_scope(|| {
            tracing::info!("dropped");
            tracing::error!("shown");
        });
        assert_eq!(read_log(dir.path()), "ERROR|factory-level|shown\n");
    }

    #[test]
    fn config_logger_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path(), "INFO");
        let first = get_config_logger("factory-rebuild", &config).unwrap();
        first.set_level(LevelFilter::ERROR).unwrap();
        let second = get_config_logger("factory-rebuild", &config).unwrap();
        assert_eq!(second.level(), LevelFilter::TRACE);
        assert_eq!(first.level(), LevelFilter::ERROR);
    }

    #[test]
    fn disable_others_spares_named_loggers() {
        let keep = get_default_logger("factory-disable-keep");
        let named = get_default_logger("factory-disable-named");
        let other = get_default_logger("factory-disable-other");
        let loggers = HashMap::from([
            (keep.name().to_string(), keep.clone()),
            (named.name().to_string(), named.clone()),
            (other.name().to_string(), other.clone()),
        ]);
        let config = parse_config(
            r#"{ "version": 1, "loggers": { "": {}, "factory-disable-named": { "level": "WARN" } } }"#,
        )
        .unwrap();
        disable_others(&loggers, keep.name(), &config).unwrap();
        assert_eq!(other.level(), LevelFilter::OFF);
        assert_eq!(named.level(), LevelFilter::INFO);
        assert_eq!(keep.level(), LevelFilter::INFO);
    }

    #[test]
    fn color_request_replaces_configured_logger() {
        let configured = choose_logger("factory-config-then-color", false, None).unwrap();
        assert_eq!(configured.kind(), LoggerKind::Config);
        let colored = choose_logger("factory-config-then-color", true, None).unwrap();
        assert_eq!(colored.kind(), LoggerKind::Color);
        let again = get_color_logger("factory-config-then-color");
        again.set_level(LevelFilter::WARN).unwrap();
        assert_eq!(colored.level(), LevelFilter::WARN);
    }

    #[test]
    fn choose_without_color_uses_config() {
        let logger = choose_logger("factory-choose", false, None).unwrap();
        assert_eq!(logger.kind(), LoggerKind::Config);
        assert_eq!(logger.level(), LevelFilter::DEBUG);
        let colored = choose_logger("factory-choose-color", true, None).unwrap();
        assert_eq!(colored.kind(), LoggerKind::Color);
    }

    #[test]
    fn get_logger_prefixes_program_name() {
        let logger = get_logger("factory-named", &LoggerOptions { use_color: true, ..Default::default() }).unwrap();
        assert!(logger.name().ends_with(": factory-named"));
        if std::env::var(crate::level::LEVEL_ENV).is_err() {
            assert_eq!(logger.level(), LevelFilter::INFO);
        }
    }

    #[test]
    fn appender_parts_split() {
        let (dir, prefix, suffix) = appender_parts(Path::new("/tmp/junk.log")).unwrap();
        assert_eq!(dir, Path::new("/tmp"));
        assert_eq!(prefix, "junk");
        assert_eq!(suffix.as_deref(), Some("log"));

        let (dir, prefix, suffix) = appender_parts(Path::new("plain")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(prefix, "plain");
        assert!(suffix.is_none());
    }

    #[test]
    fn rotation_kinds_map() {
        assert_eq!(RotationKind::Never.to_rotation(), tracing_appender::rolling::Rotation::NEVER);
    }
}
