//! Terminal color codes and the per-severity style table.
//!
//! Color names and their SGR numbers come from [`colored::Color`]; this module
//! only decides the parameter order and which style each severity gets.

use colored::Color;
use tracing::Level;

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

/// Resets every SGR attribute.
pub const RESET: &str = "\x1b[0m";

/// Build a Select Graphic Rendition sequence.
///
/// Parameters are emitted as background, foreground, then bold. With no
/// parameters the result is the bare `CSI m`, which terminals read as a reset.
pub fn sgr(fg: Option<Color>, bg: Option<Color>, bold: bool) -> String {
    let mut params: Vec<String> = Vec::with_capacity(3);
    if let Some(bg) = bg {
        params.push(bg.to_bg_str().to_string());
    }
    if let Some(fg) = fg {
        params.push(fg.to_fg_str().to_string());
    }
    if bold {
        params.push("1".to_string());
    }
    format!("{CSI}{}m", params.join(";"))
}

/// Record severity as seen by the formatters.
///
/// `tracing` stops at ERROR; an ERROR event carrying `critical = true` is
/// promoted to [`Severity::Critical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn from_level(level: &Level, critical: bool) -> Self {
        match *level {
            Level::TRACE => Severity::Trace,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warning,
            Level::ERROR if critical => Severity::Critical,
            Level::ERROR => Severity::Error,
        }
    }

    /// Upper-case display name (`WARNING`, `CRITICAL`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Colors and weight applied to a record's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl LevelStyle {
    pub const fn new(fg: Option<Color>, bg: Option<Color>, bold: bool) -> Self {
        Self { fg, bg, bold }
    }

    pub fn code(&self) -> String {
        sgr(self.fg, self.bg, self.bold)
    }
}

/// Severity to style lookup table with a fallback for unmapped severities.
#[derive(Debug, Clone)]
pub struct LevelStyles {
    entries: Vec<(Severity, LevelStyle)>,
    fallback: LevelStyle,
}

impl LevelStyles {
    /// Table with no entries: every severity gets `fallback`.
    pub fn empty(fallback: LevelStyle) -> Self {
        Self { entries: Vec::new(), fallback }
    }

    /// Set (or replace) the style for one severity.
    pub fn with(mut self, severity: Severity, style: LevelStyle) -> Self {
        self.entries.retain(|(s, _)| *s != severity);
        self.entries.push((severity, style));
        self
    }

    pub fn get(&self, severity: Severity) -> LevelStyle {
        self.entries
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, style)| *style)
            .unwrap_or(self.fallback)
    }
}

impl Default for LevelStyles {
    fn default() -> Self {
        Self::empty(LevelStyle::new(None, Some(Color::White), false))
            .with(Severity::Debug, LevelStyle::new(Some(Color::Cyan), None, false))
            .with(Severity::Info, LevelStyle::new(Some(Color::White), None, false))
            .with(Severity::Warning, LevelStyle::new(Some(Color::Yellow), None, true))
            .with(Severity::Error, LevelStyle::new(Some(Color::Red), None, true))
            .with(Severity::Critical, LevelStyle::new(Some(Color::White), Some(Color::Red), true))
    }
}
