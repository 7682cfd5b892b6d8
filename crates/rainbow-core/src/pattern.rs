//! Plain template formatter.
//!
//! Templates use `{placeholder}` fields, for example
//! `{asctime} - {name} - {levelname} - {message}`. They are parsed once into
//! segments; rendering never fails on an unknown field.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use crate::error::{RainbowError, Result};
use crate::record::RecordView;

pub const DETAILED_FORMAT: &str = "{asctime} - {name} - {levelname} - {message}";
pub const EMAIL_FORMAT: &str = "Timestamp: {asctime}\nModule: {module}\nLine: {lineno}\nMessage: {message}";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AscTime,
    Name,
    LevelName,
    Message,
    Module,
    Target,
    FileName,
    LineNo,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "asctime" => Field::AscTime,
            "name" => Field::Name,
            "levelname" => Field::LevelName,
            "message" => Field::Message,
            "module" => Field::Module,
            "target" => Field::Target,
            "filename" => Field::FileName,
            "lineno" => Field::LineNo,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(RainbowError::Format(format!("unclosed '{{' in {template:?}"))),
                    }
                }
                let field = Field::parse(&name)
                    .ok_or_else(|| RainbowError::Format(format!("unknown placeholder {{{name}}}")))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            '}' => return Err(RainbowError::Format(format!("unmatched '}}' in {template:?}"))),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Source of the `{asctime}` text.
pub trait Clock: Send + Sync {
    fn now(&self, datefmt: &str) -> String;
}

/// Wall clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self, datefmt: &str) -> String {
        chrono::Local::now().format(datefmt).to_string()
    }
}

pub struct PatternFormatter<C = LocalClock> {
    name: String,
    segments: Vec<Segment>,
    datefmt: String,
    clock: C,
}

impl PatternFormatter {
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self> {
        Self::with_clock(name, template, LocalClock)
    }

    pub fn detailed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: vec![
                Segment::Field(Field::AscTime),
                Segment::Literal(" - ".into()),
                Segment::Field(Field::Name),
                Segment::Literal(" - ".into()),
                Segment::Field(Field::LevelName),
                Segment::Literal(" - ".into()),
                Segment::Field(Field::Message),
            ],
            datefmt: DEFAULT_DATE_FORMAT.to_string(),
            clock: LocalClock,
        }
    }
}

impl<C: Clock> PatternFormatter<C> {
    pub fn with_clock(name: impl Into<String>, template: &str, clock: C) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            segments: parse_template(template)?,
            datefmt: DEFAULT_DATE_FORMAT.to_string(),
            clock,
        })
    }

    pub fn datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = datefmt.into();
        self
    }

    pub fn render(&self, record: &RecordView) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::AscTime) => out.push_str(&self.clock.now(&self.datefmt)),
                Segment::Field(Field::Name) => out.push_str(&self.name),
                Segment::Field(Field::LevelName) => out.push_str(record.severity.name()),
                Segment::Field(Field::Message) => out.push_str(&record.message),
                Segment::Field(Field::Module) => out.push_str(&record.module),
                Segment::Field(Field::Target) => out.push_str(&record.target),
                Segment::Field(Field::FileName) => out.push_str(record.file.as_deref().unwrap_or("")),
                Segment::Field(Field::LineNo) => out.push_str(&record.line.unwrap_or(0).to_string()),
            }
        }
        if let Some(error) = &record.error {
            out.push('\n');
            out.push_str(error);
        }
        out
    }
}

impl<S, N, C> FormatEvent<S, N> for PatternFormatter<C>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    C: Clock,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = RecordView::from_event(event);
        writeln!(writer, "{}", self.render(&record))
    }
}
