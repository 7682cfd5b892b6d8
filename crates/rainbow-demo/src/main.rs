//! # rainbow-demo
//!
//! Builds a logger from command-line flags (or a JSON logging config) and
//! emits one sample record per severity, so formatter and handler setups can
//! be eyeballed in a real terminal.
//!
//! # Usage
//!
//! ```bash
//! rainbow-demo --color --level debug
//! rainbow-demo --config logging.json --name jobs
//! LOGLEVEL=warning rainbow-demo --color --location
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rainbow_core::config::load_config;
use rainbow_core::level::parse_level;
use rainbow_core::record::RecordView;
use rainbow_core::{get_logger, LoggerOptions, RainbowFormatter};
use tracing::{debug, error, info, trace, warn};

/// Colorized terminal logging demo.
#[derive(Parser)]
#[command(name = "rainbow-demo", about = "Colorized terminal logging demo")]
struct Cli {
    /// Logger name (prefixed with the program name).
    #[arg(short, long, default_value = "demo")]
    name: String,

    /// Use the colorizing formatter.
    #[arg(short, long)]
    color: bool,

    /// Log level (trace, debug, info, warning, error, critical or 10..50).
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Shorten logger names longer than 40 characters.
    #[arg(long)]
    shorten: bool,

    /// JSON logging config used when --color is not given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print a formatter preview with the source location column.
    #[arg(long)]
    location: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Build the logger
    let config = cli.config.as_deref().map(load_config).transpose()?;
    let options = LoggerOptions {
        use_color: cli.color,
        level: parse_level(&cli.level)?,
        shorten: cli.shorten,
        config,
    };
    let logger = get_logger(&cli.name, &options)?;
    logger.init_global()?;

    info!("logger '{}' ready, level={}", logger.name(), logger.level());

    // 2. One record per severity
    trace!("trace detail");
    debug!(items = 3, "debug detail");
    info!("informational message");
    warn!(retry_in_ms = 250, "something looks off");
    let err = std::io::Error::other("connection reset by peer");
    error!(error = &err as &dyn std::error::Error, "request failed");
    error!(critical = true, "unrecoverable state");

    // 3. Optional layout preview with source locations
    if cli.location {
        println!("{}", location_preview(logger.name(), std::io::stdout().is_terminal()));
    }

    Ok(())
}

/// One formatted sample line with the source location column. Escape codes
/// only when `ansi`.
fn location_preview(name: &str, ansi: bool) -> String {
    let preview = RainbowFormatter::new(name).show_location(true);
    let record = RecordView::new(tracing::Level::INFO, "main", Some(line!()), "preview line");
    preview.format_record("00:00:00", &record, ansi)
}
