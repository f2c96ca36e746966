//! `tracing` output routed to the browser console.

use std::io;
use std::sync::OnceLock;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Collects one formatted event and hands it to the console when dropped.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            emit(self.level, line);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let msg = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&msg),
        Level::WARN => web_sys::console::warn_1(&msg),
        Level::INFO => web_sys::console::info_1(&msg),
        _ => web_sys::console::debug_1(&msg),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Picks the console method from each event's level.
#[derive(Debug, Copy, Clone, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Filter used until the configuration has been read.
pub const DEFAULT_FILTER: &str = "info";

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber with [`DEFAULT_FILTER`]. Later calls keep the
/// first subscriber.
pub fn init() {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(ConsoleMakeWriter)
                .without_time()
                .with_ansi(false),
        )
        .try_init()
        .is_ok();
    if !installed {
        tracing::debug!("tracing subscriber already installed");
        return;
    }
    if FILTER.set(handle).is_err() {
        tracing::debug!("log filter handle already stored");
    }
}

/// Swaps the installed filter. An unparsable directive keeps the current one.
pub fn set_filter(filter: &str) {
    let env_filter = match EnvFilter::try_new(filter) {
        Ok(f) => f,
        Err(err) => {
            tracing::warn!(filter, error = %err, "invalid log filter, keeping the current one");
            return;
        }
    };
    match FILTER.get() {
        Some(handle) => {
            if let Err(err) = handle.reload(env_filter) {
                tracing::warn!(filter, error = %err, "log filter not applied");
            }
        }
        None => tracing::debug!(filter, "no reloadable subscriber installed"),
    }
}
