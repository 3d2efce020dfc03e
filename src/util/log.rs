//! Diagnostics routing.
//!
//! Policy diagnostics (duplicate renderer, unknown context, shader slot
//! collisions, empty geometry) go through a [`LogSink`] so hosts can show
//! them in their own message window. The default sink forwards to `tracing`.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted by [`init_tracing`].
pub const LOG_ENV_VAR: &str = "UEBERMAN_LOG";

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Receiver of diagnostics.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, severity: Severity);
}

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn LogSink>;

/// Forwards diagnostics to `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "ueberman", "{message}"),
            Severity::Warning => tracing::warn!(target: "ueberman", "{message}"),
            Severity::Error => tracing::error!(target: "ueberman", "{message}"),
        }
    }
}

/// One collected diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub message: String,
}

/// Collects diagnostics in memory (and still forwards them to `tracing`).
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Number of records with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.records.lock().iter().filter(|r| r.severity == severity).count()
    }

    /// Whether any record of `severity` contains `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.severity == severity && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str, severity: Severity) {
        TracingSink.log(message, severity);
        self.records.lock().push(LogRecord { severity, message: message.to_string() });
    }
}

/// Install a formatting subscriber.
///
/// The filter comes from `UEBERMAN_LOG` when set, else `default_filter`
/// (e.g. `"ueberman=info"`). Calling this more than once is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
