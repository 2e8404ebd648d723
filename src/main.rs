//! relaunch - run a source file and restart it whenever it changes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relaunch::config::{ConfigError, ConfigLoader, RUNTIME_OPTS_ENV};
use relaunch::display;
use relaunch::supervisor::{Supervisor, SupervisorError};
use relaunch::watcher::{ChangeWatcher, WatcherError};

#[derive(Parser)]
#[command(
    name = "relaunch",
    about = "Run a source file and restart it whenever it changes",
    version
)]
struct Cli {
    /// Source file to run and watch [default: App.java].
    target: Option<String>,

    /// Runtime launcher the target is handed to [default: java].
    #[arg(long)]
    launcher: Option<String>,

    /// Minimum milliseconds between restarts (0 disables debouncing).
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Path to a config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(thiserror::Error, Debug)]
enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Watcher(#[from] WatcherError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    #[error("Watch loop failed: {0}")]
    WatchLoop(#[from] tokio::task::JoinError),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<(), LaunchError> {
    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;
    if let Some(target) = cli.target {
        config.target = target;
    }
    if let Some(launcher) = cli.launcher {
        config.launcher = launcher;
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        config.debounce_ms = debounce_ms;
    }

    let runtime_opts = config.resolve_runtime_opts(std::env::var(RUNTIME_OPTS_ENV).ok());
    tracing::info!(
        target = %config.target,
        launcher = %config.launcher,
        var = %config.runtime_opts_var,
        runtime_opts = %runtime_opts,
        debounce_ms = config.debounce_ms,
        "Starting launcher"
    );

    let (watch_dir, file_name) = config.watch_target();
    let mut watcher = ChangeWatcher::new(watch_dir, file_name, config.debounce())
        .with_poll_interval(config.poll_interval());
    let subscription = watcher.subscribe()?;

    let mut supervisor = Supervisor::new(config.child_command(&runtime_opts));
    if let Err(e) = supervisor.start() {
        tracing::warn!(error = %e, "Initial launch failed, waiting for changes");
    }

    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let mut watch_loop = tokio::spawn(async move {
        watcher
            .run_with(subscription, &mut supervisor, &loop_cancel)
            .await;
        supervisor
    });

    let mut supervisor = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    tracing::info!("Interrupted, stopping");
                    cancel.cancel();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
            }
            watch_loop.await?
        }
        joined = &mut watch_loop => joined?,
    };

    supervisor.shutdown().await?;
    tracing::info!(stats = ?supervisor.stats(), "Launcher stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Launcher failed");
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
