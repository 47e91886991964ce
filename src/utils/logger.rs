//! `log` backend writing to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.target(), record.args());
        write_console(record.level(), &message);
    }

    fn flush(&self) {}
}

/// Installs the console logger. Only the first call installs; later calls
/// just adjust the level.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let installed = log::set_logger(&LOGGER);
    log::set_max_level(level);
    installed
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, message: &str) {
    let value = wasm_bindgen::JsValue::from_str(message);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

// No console outside the browser; native hosts install their own logger.
#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _message: &str) {}
