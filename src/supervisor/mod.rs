//! Supervisor module owning the child process lifecycle.

mod runner;
mod state;

pub use runner::*;
pub use state::*;
