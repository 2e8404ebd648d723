//! Supervisor owning the single child process slot.
//!
//! The supervisor launches the child, hands it to a background reaper task,
//! and serializes kill-then-relaunch transitions. The slot is shared with
//! the reaper through a mutex that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::display;
use crate::process::{ChildCommand, ChildProcess, SpawnError};
use crate::supervisor::{ChildExit, ChildState, SupervisorStats};
use crate::watcher::RestartTarget;

/// Error type for supervisor operations.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    /// The child could not be spawned. The slot is left empty.
    #[error("Failed to spawn child: {0}")]
    Spawn(#[from] SpawnError),
    /// `restart()` was called while no child was tracked.
    #[error("restart() called with no tracked child")]
    NoChild,
    /// The reaper task for the old child failed before confirming termination.
    #[error("Reaper task failed: {0}")]
    Reaper(#[from] tokio::task::JoinError),
}

#[derive(Debug, Default)]
struct ChildSlot {
    state: ChildState,
    generation: u64,
    tracked: Option<TrackedChild>,
}

impl ChildSlot {
    fn transition(&mut self, new_state: ChildState) {
        tracing::debug!(from = ?self.state, to = ?new_state, "Child state transition");
        self.state = new_state;
    }
}

#[derive(Debug)]
struct TrackedChild {
    pid: Option<u32>,
    kill_tx: oneshot::Sender<()>,
    reaper: JoinHandle<ChildExit>,
}

impl TrackedChild {
    /// Ask the reaper to kill the child and wait until it has been reaped.
    async fn terminate(self) -> Result<ChildExit, SupervisorError> {
        // A closed receiver means the reaper already saw a natural exit.
        let _ = self.kill_tx.send(());
        Ok(self.reaper.await?)
    }
}

fn lock_slot(slot: &Mutex<ChildSlot>) -> MutexGuard<'_, ChildSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wait for the child to exit, or kill it when asked to.
async fn reap(
    mut process: ChildProcess,
    kill_rx: oneshot::Receiver<()>,
    slot: Arc<Mutex<ChildSlot>>,
    generation: u64,
) -> ChildExit {
    let pid = process.id();

    tokio::select! {
        status = process.wait() => {
            let status = status
                .inspect_err(|e| tracing::warn!(?pid, error = %e, "Failed to wait for child"))
                .ok();
            tracing::info!(?pid, ?status, "Child exited");
            display::print_child_exited(pid, status);

            let mut slot = lock_slot(&slot);
            if slot.generation == generation {
                slot.transition(ChildState::ExitedNaturally);
            }
            ChildExit::Exited(status)
        }
        _ = kill_rx => {
            if let Err(e) = process.kill().await {
                tracing::warn!(?pid, error = %e, "Failed to kill child");
            }
            let status = process.wait().await.ok();
            tracing::debug!(?pid, ?status, "Child killed");
            ChildExit::Killed(status)
        }
    }
}

/// Owns the lifecycle of exactly one child process at a time.
#[derive(Debug)]
pub struct Supervisor {
    command: ChildCommand,
    slot: Arc<Mutex<ChildSlot>>,
    next_generation: u64,
    stats: SupervisorStats,
}

impl Supervisor {
    /// Create a supervisor for the given child command. Nothing is launched
    /// until [`Supervisor::start`] is called.
    #[must_use]
    pub fn new(command: ChildCommand) -> Self {
        Self {
            command,
            slot: Arc::new(Mutex::new(ChildSlot::default())),
            next_generation: 0,
            stats: SupervisorStats::default(),
        }
    }

    /// The command used for every launch.
    #[must_use]
    pub fn command(&self) -> &ChildCommand {
        &self.command
    }

    #[must_use]
    pub fn state(&self) -> ChildState {
        lock_slot(&self.slot).state
    }

    /// Process ID of the tracked child, if any.
    #[must_use]
    pub fn child_id(&self) -> Option<u32> {
        lock_slot(&self.slot).tracked.as_ref().and_then(|t| t.pid)
    }

    /// Whether a child handle is currently tracked (running or exited but
    /// not yet replaced).
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        lock_slot(&self.slot).tracked.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> SupervisorStats {
        self.stats
    }

    /// Launch the child if none is tracked.
    ///
    /// Returns once the process has been spawned; a background task reaps it.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Spawn` if the OS refuses to create the
    /// process. The failure is logged and the slot stays empty.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        let mut slot = lock_slot(&self.slot);
        if slot.tracked.is_some() {
            tracing::warn!(state = ?slot.state, "start() ignored, child already tracked");
            return Ok(());
        }

        slot.transition(ChildState::Starting);
        tracing::info!(command = %self.command.command_line(), "Starting child");

        let process = match ChildProcess::spawn(&self.command) {
            Ok(process) => process,
            Err(e) => {
                slot.transition(ChildState::Empty);
                self.stats.record_spawn_failure();
                tracing::error!(
                    command = %self.command.command_line(),
                    error = %e,
                    "Could not start child"
                );
                display::print_error(&format!(
                    "Could not run command {}: {e}",
                    self.command.command_line()
                ));
                return Err(e.into());
            }
        };

        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;
        let pid = process.id();
        let (kill_tx, kill_rx) = oneshot::channel();
        let reaper = tokio::spawn(reap(process, kill_rx, Arc::clone(&self.slot), generation));

        slot.generation = generation;
        slot.tracked = Some(TrackedChild {
            pid,
            kill_tx,
            reaper,
        });
        slot.transition(ChildState::Running);
        self.stats.record_start();

        tracing::info!(?pid, "Child started");
        display::print_child_started(pid, &self.command.command_line());
        Ok(())
    }

    /// Kill the tracked child and launch a fresh one.
    ///
    /// The old child is confirmed reaped before the new one is spawned.
    /// Returns how the old child ended.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::NoChild` if nothing is tracked, which is a
    /// caller bug. Spawn failures of the replacement are returned as
    /// `SupervisorError::Spawn` after the old child is gone.
    pub async fn restart(&mut self) -> Result<ChildExit, SupervisorError> {
        let tracked = {
            let mut slot = lock_slot(&self.slot);
            if let Some(tracked) = slot.tracked.take() {
                tracked
            } else {
                tracing::error!(state = ?slot.state, "restart() called with no tracked child");
                return Err(SupervisorError::NoChild);
            }
        };

        let old_pid = tracked.pid;
        let exit = self.retire(tracked).await?;
        tracing::info!(?old_pid, ?exit, "Old child terminated");

        self.start()?;
        self.stats.record_restart();
        display::print_restart(old_pid, self.child_id());
        Ok(exit)
    }

    /// React to a restart trigger.
    ///
    /// Restarts the tracked child, or launches a fresh one when an earlier
    /// spawn failed and the slot is empty.
    ///
    /// # Errors
    ///
    /// Propagates spawn and reaper failures.
    pub async fn on_change(&mut self) -> Result<(), SupervisorError> {
        if self.is_tracking() {
            self.restart().await.map(|_| ())
        } else {
            tracing::info!("No child tracked, launching fresh");
            self.start()
        }
    }

    /// Kill the tracked child, if any. Used when the launcher is interrupted.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::Reaper` if the reaper task failed.
    pub async fn shutdown(&mut self) -> Result<Option<ChildExit>, SupervisorError> {
        let tracked = lock_slot(&self.slot).tracked.take();
        match tracked {
            Some(tracked) => {
                let pid = tracked.pid;
                let exit = self.retire(tracked).await?;
                tracing::info!(?pid, ?exit, "Child stopped");
                Ok(Some(exit))
            }
            None => Ok(None),
        }
    }

    async fn retire(&self, tracked: TrackedChild) -> Result<ChildExit, SupervisorError> {
        let result = tracked.terminate().await;
        let mut slot = lock_slot(&self.slot);
        if let Ok(exit) = &result {
            if exit.is_killed() {
                slot.transition(ChildState::Killed);
            }
        }
        slot.transition(ChildState::Empty);
        result
    }
}

#[async_trait]
impl RestartTarget for Supervisor {
    type Error = SupervisorError;

    async fn trigger(&mut self) -> Result<(), Self::Error> {
        self.on_change().await
    }
}
