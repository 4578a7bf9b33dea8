// tests/shell_workflow.rs
//
// End-to-end runs through a real `sh` inside a temporary directory.
mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use makedag::config::ConfigFile;
use makedag::dag::Scheduler;
use makedag::engine::{CoreRuntime, InvocationOutcome, Runtime};
use makedag::exec::{DryRunExecutor, ShellExecutor};
use makedag::fs::RealFileSystem;
use tempfile::TempDir;
use tokio::sync::oneshot;

type TestResult = Result<(), Box<dyn Error>>;

fn core_for(cfg: &ConfigFile, goal: &str) -> CoreRuntime {
    CoreRuntime::new(Scheduler::from_config(cfg), vec![goal.to_string()])
}

fn shell_runtime(cfg: &ConfigFile, goal: &str, dir: &Path) -> Runtime<ShellExecutor> {
    let executor = ShellExecutor::new("sh").with_current_dir(dir).quiet();
    Runtime::new(core_for(cfg, goal), executor, Arc::new(RealFileSystem), dir)
}

fn provisioning_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_task(
            "venv",
            TaskConfigBuilder::new().dep("env/requirements.built").build(),
        )
        .with_task("env", TaskConfigBuilder::phony("mkdir -p env").build())
        .with_task(
            "env/requirements.built",
            TaskConfigBuilder::file("echo install >> install.log")
                .cmd("cp requirements-dev.txt env/requirements.built")
                .dep("env")
                .dep("requirements-dev.txt")
                .build(),
        )
        .build()
}

fn install_count(dir: &Path) -> Result<usize, Box<dyn Error>> {
    Ok(fs::read_to_string(dir.join("install.log"))?.lines().count())
}

#[tokio::test]
async fn provisioning_is_skipped_while_marker_is_fresh() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    let manifest = dir.join("requirements-dev.txt");
    fs::write(&manifest, "zeroconf\n")?;
    fs::File::options()
        .write(true)
        .open(&manifest)?
        .set_modified(SystemTime::now() - Duration::from_secs(60))?;

    let cfg = provisioning_config();

    let outcome = with_timeout(shell_runtime(&cfg, "venv", dir).run()).await?;
    assert_eq!(outcome, InvocationOutcome::Succeeded);
    assert!(dir.join("env/requirements.built").is_file());
    assert_eq!(install_count(dir)?, 1);

    let outcome = with_timeout(shell_runtime(&cfg, "venv", dir).run()).await?;
    assert_eq!(outcome, InvocationOutcome::Succeeded);
    assert_eq!(install_count(dir)?, 1);

    // A manifest edit newer than the marker forces a reinstall.
    fs::File::options()
        .write(true)
        .open(&manifest)?
        .set_modified(SystemTime::now() + Duration::from_secs(60))?;

    let outcome = with_timeout(shell_runtime(&cfg, "venv", dir).run()).await?;
    assert_eq!(outcome, InvocationOutcome::Succeeded);
    assert_eq!(install_count(dir)?, 2);

    Ok(())
}

fn packaging_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_task("clean", TaskConfigBuilder::phony("-rm -r dist").build())
        .with_task(
            "dist",
            TaskConfigBuilder::phony("mkdir dist")
                .cmd("touch dist/pkg-1.0.tar.gz dist/pkg-1.0-py3-none-any.whl")
                .cmd("ls dist > /dev/null")
                .dep("clean")
                .build(),
        )
        .build()
}

#[tokio::test]
async fn dist_starts_from_an_empty_artifact_directory() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    fs::create_dir(dir.join("dist"))?;
    fs::write(dir.join("dist/pkg-0.9.tar.gz"), "old")?;

    let cfg = packaging_config();
    let outcome = with_timeout(shell_runtime(&cfg, "dist", dir).run()).await?;

    assert_eq!(outcome, InvocationOutcome::Succeeded);
    let mut names: Vec<String> = fs::read_dir(dir.join("dist"))?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    assert_eq!(names, vec!["pkg-1.0-py3-none-any.whl", "pkg-1.0.tar.gz"]);

    Ok(())
}

#[tokio::test]
async fn clean_without_artifacts_still_succeeds() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;

    let cfg = packaging_config();
    let outcome = with_timeout(shell_runtime(&cfg, "clean", tmp.path()).run()).await?;

    assert_eq!(outcome, InvocationOutcome::Succeeded);
    assert_eq!(outcome.exit_code(), 0);

    Ok(())
}

#[tokio::test]
async fn failing_command_exit_status_is_propagated() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            "test",
            TaskConfigBuilder::phony("exit 3").cmd("touch never.txt").build(),
        )
        .build();
    let outcome = with_timeout(shell_runtime(&cfg, "test", tmp.path()).run()).await?;

    assert_eq!(
        outcome,
        InvocationOutcome::Failed {
            task: "test".to_string(),
            exit_code: 3,
        }
    );
    assert_eq!(outcome.exit_code(), 3);
    assert!(!tmp.path().join("never.txt").exists());

    Ok(())
}

#[tokio::test]
async fn interrupted_file_task_removes_partial_target() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let dir = tmp.path();

    let cfg = ConfigFileBuilder::new()
        .with_task(
            "out.txt",
            TaskConfigBuilder::file("touch out.txt && sleep 5").build(),
        )
        .build();

    let (tx, rx) = oneshot::channel();
    let marker = dir.join("out.txt");
    let watcher = tokio::spawn(async move {
        // Wait until the recipe has written its target, then interrupt.
        for _ in 0..200 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let _ = tx.send(());
    });

    let mut rt = shell_runtime(&cfg, "out.txt", dir).with_interrupt(rx);
    let outcome = with_timeout(rt.run()).await?;
    watcher.await?;

    assert_eq!(outcome, InvocationOutcome::Interrupted);
    assert_eq!(outcome.exit_code(), 130);
    assert!(!dir.join("out.txt").exists());

    Ok(())
}

#[tokio::test]
async fn dry_run_touches_nothing() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    fs::write(dir.join("requirements-dev.txt"), "zeroconf\n")?;

    let cfg = provisioning_config();
    let mut rt = Runtime::new(
        core_for(&cfg, "venv"),
        DryRunExecutor,
        Arc::new(RealFileSystem),
        dir,
    );
    let outcome = with_timeout(rt.run()).await?;

    assert_eq!(outcome, InvocationOutcome::Succeeded);
    assert!(!dir.join("env").exists());
    assert!(!dir.join("install.log").exists());

    Ok(())
}
