//! Run-state tracking for the engine's simple start/stop/cancel lifecycle.
//!
//! Unlike a PLC's BOOT/INIT/PRE_OP/RUN/FAULT/SAFE_STOP ladder, this engine has no
//! field-device bring-up phase: a program is either idle, running, winding down after a
//! cancellation request, or stopped.

use std::fmt;

/// Lifecycle states for an [`Engine`](../cyclesim_runtime/struct.Engine.html) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// Constructed but not yet started.
    #[default]
    Idle,
    /// Actively stepping cycles.
    Running,
    /// Cancellation observed; finishing the current cycle before stopping.
    Stopping,
    /// Clock stopped, collaborators closed.
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Stopping => write!(f, "STOPPING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl RunState {
    /// Whether a transition to `target` is valid from the current state.
    #[must_use]
    pub fn can_transition_to(&self, target: RunState) -> bool {
        use RunState::{Idle, Running, Stopped, Stopping};

        matches!(
            (self, target),
            (Idle, Running) | (Running, Stopping) | (Running, Stopped) | (Stopping, Stopped)
        )
    }

    /// True while the driver loop should keep stepping cycles.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_can_start() {
        assert!(RunState::Idle.can_transition_to(RunState::Running));
    }

    #[test]
    fn running_can_stop_directly_or_via_stopping() {
        assert!(RunState::Running.can_transition_to(RunState::Stopping));
        assert!(RunState::Running.can_transition_to(RunState::Stopped));
    }

    #[test]
    fn stopped_is_terminal() {
        assert!(!RunState::Stopped.can_transition_to(RunState::Running));
        assert!(!RunState::Stopped.can_transition_to(RunState::Idle));
    }

    #[test]
    fn idle_cannot_skip_to_stopped() {
        assert!(!RunState::Idle.can_transition_to(RunState::Stopped));
    }
}
