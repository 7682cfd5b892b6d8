//! Flattened view of a `tracing` event, shared by both formatters.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level};

use crate::style::Severity;

/// Field carrying error/backtrace text, rendered on its own line.
pub const ERROR_FIELD: &str = "error";

/// Boolean field that promotes an ERROR event to critical.
pub const CRITICAL_FIELD: &str = "critical";

/// Everything a formatter needs from one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub severity: Severity,
    /// Last `::` segment of the module path (or target).
    pub module: String,
    pub target: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// `message` followed by the remaining fields as ` key=value`.
    pub message: String,
    pub error: Option<String>,
}

impl RecordView {
    pub fn from_event(event: &Event<'_>) -> Self {
        let meta = event.metadata();
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let path = meta.module_path().unwrap_or_else(|| meta.target());
        let module = path.rsplit("::").next().unwrap_or(path).to_string();

        let mut message = visitor.message;
        message.push_str(&visitor.extra);

        Self {
            severity: Severity::from_level(meta.level(), visitor.critical),
            module,
            target: meta.target().to_string(),
            file: meta.file().map(str::to_string),
            line: meta.line(),
            message,
            error: visitor.error,
        }
    }

    /// Convenience constructor used by tests and callers that format records
    /// that never went through `tracing`.
    pub fn new(level: Level, module: &str, line: Option<u32>, message: &str) -> Self {
        Self {
            severity: Severity::from_level(&level, false),
            module: module.to_string(),
            target: module.to_string(),
            file: None,
            line,
            message: message.to_string(),
            error: None,
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    extra: String,
    error: Option<String>,
    critical: bool,
}

impl FieldCollector {
    fn push_extra(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        let _ = write!(self.extra, " {}={}", field.name(), value);
    }
}

impl Visit for FieldCollector {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == CRITICAL_FIELD {
            self.critical = value;
        } else {
            self.push_extra(field, format_args!("{value}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message.push_str(value),
            ERROR_FIELD => self.error = Some(value.to_string()),
            _ => self.push_extra(field, format_args!("{value:?}")),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() == ERROR_FIELD {
            let mut text = value.to_string();
            let mut source = value.source();
            while let Some(cause) = source {
                let _ = write!(text, "\ncaused by: {cause}");
                source = cause.source();
            }
            self.error = Some(text);
        } else {
            self.push_extra(field, format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => {
                let _ = write!(self.message, "{value:?}");
            }
            ERROR_FIELD => self.error = Some(format!("{value:?}")),
            _ => self.push_extra(field, format_args!("{value:?}")),
        }
    }
}
