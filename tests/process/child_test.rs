//! Tests for child process spawning and control.

use relaunch::process::{ChildCommand, ChildProcess, SpawnError};

#[test]
fn command_builder_chaining() {
    let command = ChildCommand::new("java")
        .args(["-cp", "."])
        .arg("App.java")
        .env("JAVA_OPTS", "-Xmx256m")
        .working_dir(".");

    assert_eq!(command.command_line(), "java -cp . App.java");
    assert_ne!(command, ChildCommand::new("java").args(["-cp", ".", "App.java"]));
}

#[test]
fn command_is_clone() {
    let command = ChildCommand::new("java").arg("App.java");
    assert_eq!(command.clone(), command);
}

#[tokio::test]
async fn spawn_missing_program_is_not_found() {
    let command = ChildCommand::new("/nonexistent/relaunch-test-binary");
    let result = ChildProcess::spawn(&command);
    assert!(matches!(result, Err(SpawnError::NotFound(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn spawned_process_has_pid() {
    let command = ChildCommand::new("sleep").arg("10");
    let mut process = ChildProcess::spawn(&command).unwrap();

    assert!(process.id().is_some());

    process.kill().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn kill_running_process() {
    let command = ChildCommand::new("sleep").arg("10");
    let mut process = ChildProcess::spawn(&command).unwrap();

    process.kill().await.unwrap();

    let status = process.wait().await.unwrap();
    assert!(!status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn child_receives_environment() {
    let command = ChildCommand::new("sh")
        .args(["-c", "test \"$JAVA_OPTS\" = \"-Xmx64m\""])
        .env("JAVA_OPTS", "-Xmx64m");
    let mut process = ChildProcess::spawn(&command).unwrap();

    let status = process.wait().await.unwrap();
    assert!(status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn child_runs_in_working_dir() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let command = ChildCommand::new("sh")
        .args(["-c", "touch marker"])
        .working_dir(temp_dir.path());
    let mut process = ChildProcess::spawn(&command).unwrap();

    assert!(process.wait().await.unwrap().success());
    assert!(temp_dir.path().join("marker").exists());
}
