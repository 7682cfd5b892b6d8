//! Colorizing event formatter for terminal debugging output.
//!
//! Lines look like
//!
//! ```text
//! [14:02:51] demo.rainbow-demo: net                  connected to peer
//! ```
//!
//! with a dim bold timestamp, a bold padded logger name and a message colored
//! by severity. Error text attached through the `error` field is printed in
//! red on the following line. Padding is always computed on the uncolored
//! text, so escape codes never shift the columns.
//!
//! Writers that do not accept ANSI escapes (pipes, files) get only the
//! message and the error text.

use std::fmt;

use colored::Color;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use crate::name::truncate_left;
use crate::record::RecordView;
use crate::style::{sgr, LevelStyles, RESET};

/// Time-of-day format used for the bracketed timestamp.
pub const DATE_FORMAT: &str = "%H:%M:%S";

/// Columns reserved for the logger name.
pub const NAME_PADDING: usize = 40;

/// Columns reserved for the `module:line` source location.
pub const WHO_PADDING: usize = 22;

pub struct RainbowFormatter<T = ChronoLocal> {
    name: String,
    pub show_name: bool,
    pub show_location: bool,
    pub name_padding: usize,
    pub who_padding: usize,
    pub styles: LevelStyles,
    timer: T,
}

impl RainbowFormatter {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_timer(name, ChronoLocal::new(DATE_FORMAT.to_string()))
    }
}

impl<T> RainbowFormatter<T> {
    pub fn with_timer(name: impl Into<String>, timer: T) -> Self {
        Self {
            name: name.into(),
            show_name: true,
            show_location: false,
            name_padding: NAME_PADDING,
            who_padding: WHO_PADDING,
            styles: LevelStyles::default(),
            timer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn show_name(mut self, show: bool) -> Self {
        self.show_name = show;
        self
    }

    pub fn show_location(mut self, show: bool) -> Self {
        self.show_location = show;
        self
    }

    pub fn styles(mut self, styles: LevelStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Colorized layout when `ansi`, the bare message otherwise.
    pub fn format_record(&self, time: &str, record: &RecordView, ansi: bool) -> String {
        if ansi {
            self.colorize(time, record)
        } else {
            plain_message(record)
        }
    }

    /// Lay out one record with escape codes.
    pub fn colorize(&self, time: &str, record: &RecordView) -> String {
        let style = self.styles.get(record.severity);
        let mut out = String::with_capacity(self.name_padding + record.message.len() + 48);

        out.push('[');
        out.push_str(&sgr(Some(Color::Black), None, true));
        out.push_str(time);
        out.push_str(RESET);
        out.push_str("] ");
        if self.show_name {
            out.push_str(&sgr(Some(Color::White), None, true));
            out.push_str(&pad_name(&self.name, self.name_padding));
        }
        if self.show_location {
            out.push_str(RESET);
            out.push_str(&pad_who(&record.module, record.line, self.who_padding, true));
        }
        out.push_str(RESET);
        out.push_str(&style.code());
        out.push_str(&record.message);
        out.push_str(RESET);

        if let Some(error) = &record.error {
            out.push('\n');
            out.push_str(&sgr(Some(Color::Red), None, false));
            out.push_str(error);
            out.push_str(RESET);
        }
        out
    }
}

impl<S, N, T> FormatEvent<S, N> for RainbowFormatter<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut time = String::new();
        self.timer.format_time(&mut Writer::new(&mut time))?;

        let record = RecordView::from_event(event);
        let line = self.format_record(&time, &record, writer.has_ansi_escapes());
        writeln!(writer, "{line}")
    }
}

/// Message followed by the error text on its own line, without escapes.
pub fn plain_message(record: &RecordView) -> String {
    match &record.error {
        Some(error) => format!("{}\n{error}", record.message),
        None => record.message.clone(),
    }
}

/// Pad `name` with spaces to `padding` columns. Names that do not fit are
/// truncated from the left and followed by a single space.
pub fn pad_name(name: &str, padding: usize) -> String {
    let len = name.chars().count();
    if len < padding {
        format!("{name}{}", " ".repeat(padding - len))
    } else {
        format!("{} ", truncate_left(name, padding))
    }
}

/// Render `module:line`, padded on its uncolored width to `padding` columns.
pub fn pad_who(module: &str, line: Option<u32>, padding: usize, ansi: bool) -> String {
    let line = line.unwrap_or(0);
    let plain_len = module.chars().count() + 1 + line.to_string().len();
    let spaces = " ".repeat(padding.saturating_sub(plain_len));
    if ansi {
        format!(
            "{}{module}{}:{}{line}{spaces}",
            sgr(Some(Color::Green), None, false),
            sgr(Some(Color::Black), None, true),
            sgr(Some(Color::Cyan), None, false),
        )
    } else {
        format!("{module}:{line}{spaces}")
    }
}
