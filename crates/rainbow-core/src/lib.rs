//! # rainbow-core
//!
//! Terminal-oriented logging front-end over `tracing`, providing:
//!
//! - **Formatter** (`formatter`): colorized, column-padded console lines
//! - **Styles** (`style`): SGR codes and the per-severity color table
//! - **Pattern** (`pattern`): plain `{placeholder}` template formatter
//! - **Records** (`record`): flattened event view shared by the formatters
//! - **Configuration** (`config`): JSON dictionary config for handlers
//! - **Factory** (`factory`): color, plain and configured loggers
//! - **Names** (`name`): display names derived from the invoking program
//! - **Levels** (`level`): level parsing and the `LOGLEVEL` override
//! - **Logging** (`logging`): one-call global setup
//! - **Error types** (`error`): `RainbowError` via thiserror

pub mod config;
pub mod error;
pub mod factory;
pub mod formatter;
pub mod level;
pub mod logging;
pub mod name;
pub mod pattern;
pub mod record;
pub mod style;

#[cfg(test)]
mod test_util;

pub use error::{RainbowError, Result};
pub use factory::{
    choose_logger, get_color_logger, get_config_logger, get_default_logger, get_logger, Logger, LoggerKind,
    LoggerOptions,
};
pub use formatter::RainbowFormatter;
pub use pattern::PatternFormatter;
