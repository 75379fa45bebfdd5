//! A thin running summary of cycle counts and overruns, logged
//! periodically while the daemon runs: only cycles and the clock's own
//! `exec_ratio` overrun signal, nothing else to report on.

use cyclesim_runtime::Snapshot;

/// Accumulates a summary of a realtime or generator run.
#[derive(Debug, Default)]
pub struct DiagnosticsState {
    cycle_count: u64,
    overrun_count: u64,
}

impl DiagnosticsState {
    /// An empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle's snapshot into the running summary.
    pub fn observe(&mut self, snapshot: &Snapshot) {
        self.cycle_count += 1;
        if snapshot.exec_ratio >= cyclesim_runtime::clock::EXECUTION_TIME_WARNING_THRESHOLD {
            self.overrun_count += 1;
        }
    }

    /// Total cycles observed so far.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Cycles whose execution ratio crossed the warning threshold.
    #[must_use]
    pub fn overrun_count(&self) -> u64 {
        self.overrun_count
    }

    /// `overrun_count / cycle_count`, or `0.0` before any cycle runs.
    #[must_use]
    pub fn overrun_rate(&self) -> f64 {
        if self.cycle_count == 0 {
            0.0
        } else {
            self.overrun_count as f64 / self.cycle_count as f64
        }
    }
}
