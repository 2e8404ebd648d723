//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::process::ChildCommand;

/// Environment variable the child's runtime options are read from.
pub const RUNTIME_OPTS_ENV: &str = "APP_JAVA_OPTS";

/// Runtime options used when [`RUNTIME_OPTS_ENV`] is unset.
pub const DEFAULT_RUNTIME_OPTS: &str = "-Xmx256m";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Source file to run and watch.
    pub target: String,
    /// Runtime launcher executable the target is handed to.
    pub launcher: String,
    /// Directory to watch. Defaults to the target's parent, or `.`.
    pub watch_dir: Option<PathBuf>,
    /// Minimum milliseconds between accepted restarts. Zero disables debouncing.
    pub debounce_ms: u64,
    /// Upper bound for each poll of the watch loop.
    pub poll_interval_ms: u64,
    /// Name of the variable the runtime options are passed to the child in.
    pub runtime_opts_var: String,
    /// Runtime options. Overrides the environment when set.
    pub runtime_opts: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            target: "App.java".to_string(),
            launcher: "java".to_string(),
            watch_dir: None,
            debounce_ms: 0,
            poll_interval_ms: 150,
            runtime_opts_var: "JAVA_OPTS".to_string(),
            runtime_opts: None,
        }
    }
}

impl LauncherConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Directory to watch and the exact file name that triggers a restart.
    #[must_use]
    pub fn watch_target(&self) -> (PathBuf, String) {
        let target = Path::new(&self.target);
        let file_name = target
            .file_name()
            .map_or_else(|| self.target.clone(), |n| n.to_string_lossy().into_owned());

        let dir = self.watch_dir.clone().unwrap_or_else(|| {
            target
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });

        (dir, file_name)
    }

    /// Runtime options for the child: explicit config first, then the
    /// environment value, then the default.
    #[must_use]
    pub fn resolve_runtime_opts(&self, from_env: Option<String>) -> String {
        self.runtime_opts
            .clone()
            .or(from_env)
            .unwrap_or_else(|| DEFAULT_RUNTIME_OPTS.to_string())
    }

    /// Command used for every launch of the child.
    #[must_use]
    pub fn child_command(&self, runtime_opts: &str) -> ChildCommand {
        ChildCommand::new(&self.launcher)
            .arg(&self.target)
            .env(&self.runtime_opts_var, runtime_opts)
            .working_dir(".")
    }
}
