//! Cycle counter, simulated time, and real-time pacing.
//!
//! Follows a measure → warn/sleep → update-reference ordering each
//! cycle: the 0.6 execution-ratio warning threshold, the 1.5x lag safety
//! margin, and the 10-sample record-length floor all come from that
//! ordering. Pacing uses only `std::thread::sleep` — this workspace
//! denies `unsafe_code` and hard real-time guarantees are out of scope,
//! so there is no raw-syscall sleep path for tighter jitter.

use cyclesim_common::{sim_time, EngineError, EngineResult};
use std::time::{Duration, Instant};
use tracing::warn;

/// Fraction of the cycle period after which `step()` emits an
/// execution-time warning.
pub const EXECUTION_TIME_WARNING_THRESHOLD: f64 = 0.6;

/// Multiplier applied to a variable's maximum lag to compute its history
/// buffer capacity, absorbing writer/reader ordering within a cycle.
pub const LAG_SAFETY_MARGIN: f64 = 1.5;

/// Floor on a history buffer's capacity regardless of lag requirement.
pub const MIN_RECORD_LENGTH: usize = 10;

/// Compute a variable's history capacity from its maximum lag:
/// `max(10, ceil(1.5 * maxLag))`.
#[must_use]
pub fn history_capacity(max_lag: i64) -> usize {
    let scaled = (max_lag as f64 * LAG_SAFETY_MARGIN).ceil() as i64;
    scaled.max(MIN_RECORD_LENGTH as i64) as usize
}

/// Clock driving mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Paces cycles against wall-clock time, sleeping out any slack.
    Realtime,
    /// Never sleeps; advances as fast as the caller drives it.
    Generator,
}

/// Clock construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    /// Cycle period in seconds. Must be `> 0`.
    pub cycle_time: f64,
    /// Absolute or relative start timestamp used by `sim_time`.
    pub start_time: f64,
    /// Driving mode.
    pub mode: ClockMode,
    /// Sampling interval in seconds. Must be `>= cycle_time`. Defaults to
    /// `cycle_time` (sample every cycle).
    pub sample_interval: f64,
    /// Optional `chrono` strftime-style pattern for `time_str`; `None`
    /// means RFC 3339.
    pub time_format: Option<String>,
}

impl ClockConfig {
    /// Validate configuration invariants; construction fails loudly
    /// rather than silently clamping.
    pub fn validate(&self) -> EngineResult<()> {
        if self.cycle_time <= 0.0 {
            return Err(EngineError::config("cycle_time must be positive"));
        }
        if self.sample_interval < self.cycle_time {
            return Err(EngineError::config(
                "sample_interval must be >= cycle_time",
            ));
        }
        Ok(())
    }
}

/// The result of one `step()` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTick {
    /// Cycles executed so far, including this one.
    pub cycle_count: u64,
    /// Whether this cycle lands on the sample stride.
    pub need_sample: bool,
    /// Formatted simulated time.
    pub time_str: String,
    /// Simulated time in seconds.
    pub sim_time: f64,
    /// Fraction of the cycle period consumed by work, clamped to `[0, 1]`.
    pub exec_ratio: f64,
}

/// Cyclic clock: counts cycles, tracks simulated time, and (in
/// [`ClockMode::Realtime`]) paces execution against wall-clock time.
pub struct Clock {
    config: ClockConfig,
    sample_stride: u64,
    cycle_count: u64,
    running: bool,
    current_cycle_start: Instant,
}

impl Clock {
    /// Construct a new, stopped clock.
    pub fn new(config: ClockConfig) -> EngineResult<Self> {
        config.validate()?;
        let sample_stride = ((config.sample_interval / config.cycle_time).floor() as u64).max(1);
        Ok(Self {
            config,
            sample_stride,
            cycle_count: 0,
            running: false,
            current_cycle_start: Instant::now(),
        })
    }

    /// Start the clock, initializing the cycle-start reference.
    pub fn start(&mut self) {
        self.running = true;
        self.current_cycle_start = Instant::now();
    }

    /// Stop the clock.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Reset the cycle counter to `n`.
    pub fn reset(&mut self, n: u64) {
        self.cycle_count = n;
    }

    /// Whether the clock has been started and not yet stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Cycles executed so far.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// The single tick primitive: measure, warn/sleep/overrun, advance.
    ///
    /// In [`ClockMode::Generator`] this never sleeps and `exec_ratio` is
    /// always `0.0`; simulated time still advances exactly, computed from
    /// the cycle count rather than accumulated wall-clock deltas.
    pub fn step(&mut self) -> CycleTick {
        let now = Instant::now();
        let exec = now.duration_since(self.current_cycle_start).as_secs_f64();

        let exec_ratio = match self.config.mode {
            ClockMode::Realtime => {
                let ratio = (exec / self.config.cycle_time).min(1.0);
                if exec > EXECUTION_TIME_WARNING_THRESHOLD * self.config.cycle_time {
                    warn!(
                        exec_ratio = ratio,
                        cycle_time = self.config.cycle_time,
                        "cycle execution time exceeded {:.0}% of the cycle period",
                        EXECUTION_TIME_WARNING_THRESHOLD * 100.0
                    );
                }
                if exec < self.config.cycle_time {
                    let remaining = self.config.cycle_time - exec;
                    std::thread::sleep(Duration::from_secs_f64(remaining));
                } else {
                    warn!(exec_ratio = ratio, "cycle overrun, not sleeping");
                }
                ratio
            }
            ClockMode::Generator => 0.0,
        };

        self.current_cycle_start = Instant::now();
        self.cycle_count += 1;
        let need_sample = self.cycle_count % self.sample_stride == 0;
        let t = sim_time(self.config.start_time, self.cycle_count, self.config.cycle_time);
        let time_str = cyclesim_common::format_time(t, self.config.time_format.as_deref());

        CycleTick {
            cycle_count: self.cycle_count,
            need_sample,
            time_str,
            sim_time: t,
            exec_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(cycle_time: f64, mode: ClockMode) -> ClockConfig {
        ClockConfig {
            cycle_time,
            start_time: 0.0,
            mode,
            sample_interval: cycle_time,
            time_format: None,
        }
    }

    #[test]
    fn rejects_non_positive_cycle_time() {
        assert!(Clock::new(cfg(0.0, ClockMode::Generator)).is_err());
    }

    #[test]
    fn rejects_sample_interval_below_cycle_time() {
        let mut c = cfg(1.0, ClockMode::Generator);
        c.sample_interval = 0.5;
        assert!(Clock::new(c).is_err());
    }

    #[test]
    fn generator_mode_never_reports_exec_ratio() {
        let mut clock = Clock::new(cfg(0.001, ClockMode::Generator)).unwrap();
        clock.start();
        let tick = clock.step();
        assert_eq!(tick.exec_ratio, 0.0);
        assert_eq!(tick.cycle_count, 1);
    }

    #[test]
    fn sample_stride_gates_need_sample() {
        let mut c = cfg(0.001, ClockMode::Generator);
        c.sample_interval = 0.002; // stride 2
        let mut clock = Clock::new(c).unwrap();
        clock.start();
        let t1 = clock.step();
        let t2 = clock.step();
        assert!(!t1.need_sample);
        assert!(t2.need_sample);
    }

    #[test]
    fn sim_time_advances_exactly_with_cycle_count() {
        let mut clock = Clock::new(cfg(0.1, ClockMode::Generator)).unwrap();
        clock.start();
        for _ in 0..10 {
            clock.step();
        }
        let tick = clock.step();
        assert_eq!(tick.cycle_count, 11);
        assert!((tick.sim_time - 1.1).abs() < 1e-9);
    }

    #[test]
    fn reset_sets_the_cycle_counter() {
        let mut clock = Clock::new(cfg(0.01, ClockMode::Generator)).unwrap();
        clock.reset(100);
        assert_eq!(clock.cycle_count(), 100);
    }

    #[test]
    fn history_capacity_applies_floor_and_margin() {
        assert_eq!(history_capacity(1), MIN_RECORD_LENGTH);
        assert_eq!(history_capacity(30), 45);
    }
}
