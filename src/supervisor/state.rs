//! Child slot state machine.

use std::process::ExitStatus;

/// Lifecycle state of the supervised child slot.
///
/// `Empty → Starting → Running → (Killed | ExitedNaturally) → Empty`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildState {
    #[default]
    Empty,
    Starting,
    Running,
    Killed,
    ExitedNaturally,
}

/// How a tracked child ended, as reported by its reaper task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Killed on request of the supervisor.
    Killed(Option<ExitStatus>),
    /// Exited on its own before any kill request.
    Exited(Option<ExitStatus>),
}

impl ChildExit {
    #[must_use]
    pub fn is_killed(&self) -> bool {
        matches!(self, Self::Killed(_))
    }
}

/// In-memory counters for the current launcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
    pub starts: usize,
    pub restarts: usize,
    pub spawn_failures: usize,
}

impl SupervisorStats {
    pub(crate) fn record_start(&mut self) {
        self.starts = self.starts.saturating_add(1);
    }

    pub(crate) fn record_restart(&mut self) {
        self.restarts = self.restarts.saturating_add(1);
    }

    pub(crate) fn record_spawn_failure(&mut self) {
        self.spawn_failures = self.spawn_failures.saturating_add(1);
    }
}
