//! Restart trigger seam between the watcher and whatever it drives.

use async_trait::async_trait;

/// Receives restart triggers from the change watcher.
#[async_trait]
pub trait RestartTarget: Send {
    /// Error reported by a failed trigger. Logged by the watcher, never fatal.
    type Error: std::fmt::Display + Send;

    /// Handle one accepted, debounced change.
    async fn trigger(&mut self) -> Result<(), Self::Error>;
}
