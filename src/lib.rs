//! relaunch - run a source file and restart it whenever it changes.

pub mod config;
pub mod display;
pub mod process;
pub mod supervisor;
pub mod watcher;
