// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod scaffold;
pub mod script;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::exec::{EngineBackend, QueueEvent, QueueRunner};
use crate::scaffold::ScaffoldOutcome;
use crate::script::Engine;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - `--init` scaffolding
/// - script compilation
/// - `--list` output
/// - the sequential task queue, its progress output and Ctrl-C handling
///
/// Returns `Ok(false)` when something failed in a way that has already been
/// reported to the user.
pub async fn run(args: CliArgs) -> Result<bool> {
    let cfg = effective_config(&args)?;
    debug!(?cfg, "effective configuration");

    if args.init {
        return init_taskfile(&cfg);
    }

    let engine = match Engine::compile(&cfg.taskfile, cfg.engine_options()) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            eprintln!("{}", report::render_compile_error(&err, &current_dir()));
            return Ok(false);
        }
    };

    if args.list {
        return list_tasks(engine).await;
    }

    let tasks = if args.tasks.is_empty() {
        vec![cfg.default_task.clone()]
    } else {
        args.tasks.clone()
    };

    run_tasks(engine, tasks, cfg.fail_fast).await
}

/// Config file values with CLI flags applied on top.
fn effective_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = load_or_default(&args.config)?;

    if let Some(taskfile) = &args.taskfile {
        cfg.taskfile = PathBuf::from(taskfile);
    }
    if args.fail_fast {
        cfg.fail_fast = true;
    }

    Ok(cfg)
}

fn init_taskfile(cfg: &ConfigFile) -> Result<bool> {
    let dir = current_dir();
    match scaffold::scaffold(&cfg.taskfile)? {
        ScaffoldOutcome::Created(path) => {
            println!("luatask: created {} in {}", path.display(), dir.display());
            Ok(true)
        }
        ScaffoldOutcome::AlreadyExists(path) => {
            eprintln!(
                "luatask [error]: {} already exists in {}",
                path.display(),
                dir.display()
            );
            Ok(false)
        }
    }
}

async fn list_tasks(engine: Arc<Engine>) -> Result<bool> {
    let harvested = tokio::task::spawn_blocking(move || engine.list()).await?;

    match harvested {
        Ok(registry) => {
            println!("{}", report::render_listing(&registry));
            Ok(true)
        }
        Err(err) => {
            eprintln!("{}", report::render_harvest_error(&err));
            Ok(false)
        }
    }
}

async fn run_tasks(engine: Arc<Engine>, tasks: Vec<String>, fail_fast: bool) -> Result<bool> {
    let (event_tx, event_rx) = mpsc::channel::<QueueEvent>(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // First Ctrl-C: let the running task finish, skip the rest.
    // Second Ctrl-C: give up immediately.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        eprintln!("luatask: interrupted; finishing the current task (Ctrl+C again to abort)");
        let _ = shutdown_tx.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let printer = tokio::spawn(report::print_events(event_rx));

    info!(?tasks, fail_fast, "running task queue");
    let runner = QueueRunner::new(EngineBackend::new(engine), event_tx, shutdown_rx);
    let summary = runner.run(tasks, fail_fast).await;

    // The runner owned the only sender; the printer ends once it is drained.
    printer.await?;

    if let Some(line) = report::render_summary(&summary) {
        eprintln!("{line}");
    }

    Ok(summary.all_succeeded())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
