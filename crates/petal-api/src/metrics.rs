// Call-outcome reporting.
//
// The executor reports every terminal outcome to a `MetricsSink`. The
// default sink emits a tracing event; deployments can plug in a real
// metrics backend.

use std::time::Duration;

use tracing::debug;

/// Summary of one logical call, reported once it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    pub path: String,
    pub duration: Duration,
    pub succeeded: bool,
    /// Attempts made, including the first.
    pub attempts: u32,
}

impl CallReport {
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }
}

/// Receiver for call reports. Must not block.
pub trait MetricsSink: Send + Sync {
    fn record(&self, report: &CallReport);
}

/// Default sink: one `debug` event per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn record(&self, report: &CallReport) {
        debug!(
            path = %report.path,
            duration_ms = report.duration_ms(),
            succeeded = report.succeeded,
            attempts = report.attempts,
            "request finished"
        );
    }
}
