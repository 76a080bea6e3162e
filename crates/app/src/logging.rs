//! Logging setup and the logger capability handed to controllers.
//!
//! Controllers never talk to a global logger: they hold an optional
//! [`Logger`] and stay silent without one.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `level` when set.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

/// Tagged, best-effort message sink.
pub trait Logger: Send + Sync {
    fn log(&self, tag: &str, message: &str);
}

/// Emits each message as a `tracing` info event with the tag as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, tag: &str, message: &str) {
        if tag.is_empty() || message.is_empty() {
            return;
        }
        tracing::info!(tag, "{message}");
    }
}

#[cfg(test)]
pub mod testing {
    use super::Logger;
    use std::sync::Mutex;

    /// Collects `(tag, message)` pairs in memory.
    #[derive(Debug, Default)]
    pub struct MemoryLogger {
        records: Mutex<Vec<(String, String)>>,
    }

    impl MemoryLogger {
        pub fn records(&self) -> Vec<(String, String)> {
            self.records.lock().unwrap().clone()
        }
    }

    impl Logger for MemoryLogger {
        fn log(&self, tag: &str, message: &str) {
            if tag.is_empty() || message.is_empty() {
                return;
            }
            self.records
                .lock()
                .unwrap()
                .push((tag.to_string(), message.to_string()));
        }
    }
}
