//! Collaborator fan-out: live publisher and history sink traits.
//!
//! A narrow required surface with a default method, plus no-op
//! implementations used in tests and by the daemon's default run. The
//! "device" on the other end is a Redis-like live channel or a
//! DuckDB-like history store; this crate ships only the trait interfaces
//! and trivial in-process stand-ins sufficient to run the daemon and
//! exercise the contract — wiring real collaborators is out of scope.

use crate::snapshot::Snapshot;
use cyclesim_common::{EngineError, EngineResult};
use std::sync::Mutex;

/// Consumes one snapshot per cycle for a live pub/sub channel. A failure
/// is logged and isolates the cycle — it never aborts the run.
pub trait LivePublisher: Send {
    /// Publish `snapshot`. Returning `Err` is recoverable; the engine
    /// logs it and continues.
    fn publish(&mut self, snapshot: &Snapshot) -> EngineResult<()>;
}

/// Records sampled snapshots into long-term storage.
pub trait HistorySink: Send {
    /// Record `snapshot`. Only called when `snapshot.need_sample` is true.
    fn record(&mut self, snapshot: &Snapshot) -> EngineResult<()>;

    /// Flush any buffered writes. Default is a no-op for sinks that write
    /// through immediately.
    fn flush(&mut self) -> EngineResult<()> {
        Ok(())
    }

    /// Release resources at the end of a run. Default is a no-op.
    fn close(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

/// Publishes snapshots as `tracing::debug!` events carrying a JSON body.
/// Sufficient to exercise the contract without a real pub/sub channel.
#[derive(Debug, Default)]
pub struct LoggingPublisher;

impl LivePublisher for LoggingPublisher {
    fn publish(&mut self, snapshot: &Snapshot) -> EngineResult<()> {
        let body = serde_json::to_string(snapshot)
            .map_err(|e| EngineError::sink(format!("failed to serialize snapshot: {e}")))?;
        tracing::debug!(target: "cyclesim::publish", snapshot = %body, "publishing snapshot");
        Ok(())
    }
}

/// A history sink that discards everything. The default when no real
/// storage backend is configured.
#[derive(Debug, Default)]
pub struct NullSink;

impl HistorySink for NullSink {
    fn record(&mut self, _snapshot: &Snapshot) -> EngineResult<()> {
        Ok(())
    }
}

/// An in-memory history sink, useful for tests and short-lived runs.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<Snapshot>>,
}

impl MemorySink {
    /// Construct an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every snapshot recorded so far, in order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.records.lock().expect("memory sink mutex poisoned").clone()
    }
}

impl HistorySink for MemorySink {
    fn record(&mut self, snapshot: &Snapshot) -> EngineResult<()> {
        self.records
            .lock()
            .expect("memory sink mutex poisoned")
            .push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snap() -> Snapshot {
        Snapshot {
            variables: HashMap::new(),
            cycle_count: 1,
            need_sample: true,
            time_str: "1970-01-01T00:00:00Z".to_string(),
            sim_time: 0.0,
            exec_ratio: 0.0,
        }
    }

    #[test]
    fn null_sink_accepts_and_discards() {
        let mut sink = NullSink;
        assert!(sink.record(&snap()).is_ok());
    }

    #[test]
    fn memory_sink_accumulates_records() {
        let mut sink = MemorySink::new();
        sink.record(&snap()).unwrap();
        sink.record(&snap()).unwrap();
        assert_eq!(sink.snapshots().len(), 2);
    }

    #[test]
    fn logging_publisher_serializes_without_error() {
        let mut pub_ = LoggingPublisher;
        assert!(pub_.publish(&snap()).is_ok());
    }
}
