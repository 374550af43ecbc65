//! Diagnostic stream handling for external tool output.
//!
//! The proving tool logs to stderr; lines are classified and forwarded to
//! an injected sink rather than a process-wide stream, so per-call
//! filtering never touches global state.

/// Severity of one line on the external tool's diagnostic stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Classifies a raw stderr line by the tool's log prefix.
    pub fn classify(line: &str) -> Self {
        let line = line.trim_start();
        if line.starts_with("[ERROR]") || line.starts_with("ERROR") {
            Severity::Error
        } else if line.starts_with("[WARNING]") || line.starts_with("WARNING") {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, severity: Severity, line: &str);
}

/// Default sink: forwards to `tracing` at the matching level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, severity: Severity, line: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "snarkpipe::tool", "{line}"),
            Severity::Warning => tracing::warn!(target: "snarkpipe::tool", "{line}"),
            Severity::Error => tracing::error!(target: "snarkpipe::tool", "{line}"),
        }
    }
}

/// Substrings the proving tool emits when its wasm heap is under pressure
/// on constrained platforms. Noise, not faults.
const MEMORY_PRESSURE_MARKERS: &[&str] = &[
    "Cannot enlarge memory",
    "Memory size exceeded",
    "abort(OOM)",
];

/// Per-call wrapper that drops memory-pressure noise below `Error`
/// severity and passes everything else through.
///
/// Borrowing the base sink scopes the filter to one proving call: the
/// wrapper is constructed on entry, dropped on exit (failure included),
/// and the base sink itself is never modified.
pub struct MemoryPressureFilter<'a> {
    inner: &'a dyn DiagnosticsSink,
}

impl<'a> MemoryPressureFilter<'a> {
    pub fn new(inner: &'a dyn DiagnosticsSink) -> Self {
        Self { inner }
    }

    fn is_memory_pressure(line: &str) -> bool {
        MEMORY_PRESSURE_MARKERS.iter().any(|m| line.contains(m))
    }
}

impl DiagnosticsSink for MemoryPressureFilter<'_> {
    fn emit(&self, severity: Severity, line: &str) {
        if severity < Severity::Error && Self::is_memory_pressure(line) {
            return;
        }
        self.inner.emit(severity, line);
    }
}
