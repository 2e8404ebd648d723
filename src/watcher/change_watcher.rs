//! Change watcher with notify integration.
//!
//! Watches one directory non-recursively and turns modification events on a
//! single file name into debounced restart triggers.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::debounce::Debouncer;
use super::error::WatcherError;
use super::trigger::RestartTarget;
use crate::display;

/// Default bound on each poll of the event channel.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Live registration with the OS watcher plus the channel it feeds.
///
/// Dropping the subscription releases the OS watch handle.
pub struct EventSubscription {
    watcher: Option<RecommendedWatcher>,
    watch_dir: PathBuf,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl EventSubscription {
    /// Build a subscription fed by an arbitrary channel instead of the OS.
    #[must_use]
    pub fn from_channel(rx: mpsc::UnboundedReceiver<notify::Result<Event>>) -> Self {
        Self {
            watcher: None,
            watch_dir: PathBuf::new(),
            rx,
        }
    }

    fn release(mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.watch_dir) {
                tracing::debug!(error = %e, "Failed to release watch handle");
            }
        }
    }
}

/// Watches one directory for modifications of one file name.
#[derive(Debug)]
pub struct ChangeWatcher {
    watch_dir: PathBuf,
    file_name: String,
    debouncer: Debouncer,
    poll_interval: Duration,
}

impl ChangeWatcher {
    /// Create a watcher for `file_name` inside `watch_dir`.
    #[must_use]
    pub fn new(
        watch_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            file_name: file_name.into(),
            debouncer: Debouncer::new(debounce),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the bounded poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Register a non-recursive watch on the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or the OS refuses
    /// the watch. Both are fatal to the launcher.
    pub fn subscribe(&self) -> Result<EventSubscription, WatcherError> {
        if !self.watch_dir.is_dir() {
            return Err(WatcherError::DirectoryNotFound(self.watch_dir.clone()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let _ = tx.send(result);
        })?;
        watcher.watch(&self.watch_dir, RecursiveMode::NonRecursive)?;

        let shown =
            std::path::absolute(&self.watch_dir).unwrap_or_else(|_| self.watch_dir.clone());
        tracing::info!(dir = %shown.display(), file = %self.file_name, "Start change tracking");
        display::print_watching(&shown, &self.file_name);

        Ok(EventSubscription {
            watcher: Some(watcher),
            watch_dir: self.watch_dir.clone(),
            rx,
        })
    }

    /// Register the watch and loop until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error only if the watch cannot be registered.
    pub async fn run<T>(
        &mut self,
        target: &mut T,
        cancel: &CancellationToken,
    ) -> Result<(), WatcherError>
    where
        T: RestartTarget + ?Sized,
    {
        let subscription = self.subscribe()?;
        self.run_with(subscription, target, cancel).await;
        Ok(())
    }

    /// Loop over an existing subscription until `cancel` fires or the event
    /// source goes away.
    ///
    /// Each iteration waits at most one poll interval, then drains every
    /// queued event as one batch in delivery order.
    pub async fn run_with<T>(
        &mut self,
        mut subscription: EventSubscription,
        target: &mut T,
        cancel: &CancellationToken,
    ) where
        T: RestartTarget + ?Sized,
    {
        while !cancel.is_cancelled() {
            let polled = tokio::time::timeout(self.poll_interval, subscription.rx.recv()).await;
            let first = match polled {
                Ok(Some(result)) => result,
                Ok(None) => {
                    tracing::warn!("Event source closed, stopping change tracking");
                    break;
                }
                Err(_) => continue,
            };

            let mut batch = vec![first];
            while let Ok(result) = subscription.rx.try_recv() {
                batch.push(result);
            }

            for result in batch {
                match result {
                    Ok(event) => {
                        self.handle_event(&event, target).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Watch error, continuing");
                    }
                }
            }
        }

        tracing::debug!("Change tracking stopped");
        subscription.release();
    }

    /// Whether `event` is a modification of the watched file name.
    ///
    /// Renames are reported as `Modify(Name(_))` but do not count.
    #[must_use]
    pub fn is_qualifying(&self, event: &Event) -> bool {
        let modified = match event.kind {
            EventKind::Modify(ModifyKind::Name(_)) => false,
            EventKind::Modify(_) => true,
            _ => false,
        };
        modified
            && event
                .paths
                .iter()
                .any(|p| {
                    p.file_name()
                        .is_some_and(|name| name == self.file_name.as_str())
                })
    }

    /// Filter and debounce one event, triggering `target` if it passes.
    ///
    /// Returns `true` if the target was triggered. Trigger failures are
    /// logged and do not stop the watcher.
    pub async fn handle_event<T>(&mut self, event: &Event, target: &mut T) -> bool
    where
        T: RestartTarget + ?Sized,
    {
        if !self.is_qualifying(event) {
            tracing::trace!(kind = ?event.kind, paths = ?event.paths, "Ignoring event");
            return false;
        }

        if !self.debouncer.accept(Instant::now()) {
            tracing::debug!(file = %self.file_name, "Change debounced");
            return false;
        }

        tracing::info!(file = %self.file_name, "Changes detected");
        display::print_change_detected(&self.file_name);

        if let Err(e) = target.trigger().await {
            tracing::error!(error = %e, "Restart failed");
            display::print_error(&format!("Restart failed: {e}"));
        }
        true
    }
}
