//! Capturing writer and fixed clocks for formatter tests.

use std::fmt::Write as _;
use std::io;
use std::sync::{Arc, Mutex};

use tracing::Dispatch;
use tracing_subscriber::fmt::format::{DefaultFields, FormatEvent, Writer};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::Registry;

use crate::pattern::Clock;

#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub struct FixedTime(pub &'static str);

impl FormatTime for FixedTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        w.write_str(self.0)
    }
}

pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn now(&self, _datefmt: &str) -> String {
        self.0.to_string()
    }
}

/// Dispatcher that formats every event with `format` into a shared buffer.
pub fn capture<F>(format: F, ansi: bool) -> (Dispatch, SharedBuf)
where
    F: FormatEvent<Registry, DefaultFields> + Send + Sync + 'static,
{
    let buf = SharedBuf::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(ansi)
        .event_format(format)
        .with_writer(buf.clone())
        .finish();
    (Dispatch::new(subscriber), buf)
}
