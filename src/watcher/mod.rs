//! Watcher module for the supervised source file.
//!
//! Turns filesystem modification events into debounced restart triggers.

mod change_watcher;
mod debounce;
mod error;
mod trigger;

pub use change_watcher::{ChangeWatcher, EventSubscription, DEFAULT_POLL_INTERVAL};
pub use debounce::Debouncer;
pub use error::WatcherError;
pub use trigger::RestartTarget;
