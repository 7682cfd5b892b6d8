//! Typed error definitions for rainbow-log.
//!
//! Provides [`RainbowError`] for everything that can go wrong while building a
//! logger: a bad level string, an inconsistent config document, or a failure
//! to open a log file. All variants implement `std::error::Error` via
//! `thiserror`, so they integrate with `anyhow::Result` in binaries.

use thiserror::Error;

/// Domain-specific errors for rainbow-log.
#[derive(Debug, Error)]
pub enum RainbowError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// A level name or number that does not map to any severity.
    #[error("unknown log level: {0:?}")]
    Level(String),

    /// Formatter template error (unknown placeholder, unbalanced brace).
    #[error("format error: {0}")]
    Format(String),

    /// Log file or config file I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error for config documents.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rolling file appender could not be initialized.
    #[error("appender error: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A global default subscriber was already installed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] tracing::dispatcher::SetGlobalDefaultError),

    /// The logger's level filter could not be reloaded.
    #[error("reload error: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),
}

pub type Result<T> = std::result::Result<T, RainbowError>;
