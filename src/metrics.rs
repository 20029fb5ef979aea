//! Metrics for connection lifecycle events
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

/// Counters
pub mod counters {
    /// A connect attempt started
    pub fn connect_attempted() {
        ::metrics::counter!("dbconnect_connect_attempts_total").increment(1);
    }

    /// A connect attempt failed; `reason` is the error category
    pub fn connect_failed(reason: &'static str) {
        ::metrics::counter!("dbconnect_connect_failures_total", "reason" => reason)
            .increment(1);
    }

    /// A handle was released
    pub fn connection_closed() {
        ::metrics::counter!("dbconnect_connections_closed_total").increment(1);
    }
}

/// Histograms
pub mod histograms {
    /// Time from connect attempt to open handle
    pub fn connect_duration(duration_ms: u64) {
        ::metrics::histogram!("dbconnect_connect_duration_ms").record(duration_ms as f64);
    }
}
