//! Watcher error types.

use std::path::PathBuf;

/// Errors that can occur while setting up or running the change watcher.
#[derive(thiserror::Error, Debug)]
pub enum WatcherError {
    /// The directory to watch does not exist or is not a directory.
    #[error("Watch directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Notify watcher error.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
