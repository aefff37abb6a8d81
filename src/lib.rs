// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod input;
pub mod logging;
pub mod platform;
pub mod supervisor;
pub mod types;
pub mod watch;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::build::{Builder, CartBuilder};
use crate::cli::CliArgs;
use crate::config::resolve_build_config;
use crate::console::{ConsoleLog, LogSink};
use crate::engine::report::{log_build_failure, log_build_result};
use crate::engine::{Command, Orchestrator, RuntimeEvent};
use crate::input::{help_line, spawn_keyboard_reader, RawModeGuard};
use crate::supervisor::{PlatformReload, ProcessSupervisor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the cart builder
/// - the file watcher
/// - the keyboard reader (unless `--no-input`)
/// - Ctrl-C handling
/// - the orchestrator loop
pub async fn run(args: CliArgs) -> Result<()> {
    let config = resolve_build_config(&args)?;
    let mut builder = CartBuilder::new()?;

    if args.build_only {
        let mut console = ConsoleLog::new(false);
        console.clear();
        let outcome = builder.build(&config);
        match &outcome {
            Ok(result) => log_build_result(&mut console, result),
            Err(err) => log_build_failure(&mut console, err),
        }
        console.render();
        outcome?;
        return Ok(());
    }

    // Runtime event channel. Unbounded so that process monitors never block
    // while the orchestrator awaits their teardown.
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    let _watcher = crate::watch::spawn_watcher(&config.input, rt_tx.clone())?;

    let _raw_mode = if args.no_input {
        None
    } else {
        let guard = RawModeGuard::enable()?;
        spawn_keyboard_reader(rt_tx.clone());
        Some(guard)
    };

    // Ctrl-C → Quit. In raw mode Ctrl-C arrives as a key instead.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::Command(Command::Quit));
        });
    }

    let console = ConsoleLog::new(!args.no_input).with_footer(help_line());
    let supervisor = ProcessSupervisor::new(rt_tx, Box::new(PlatformReload));
    let orchestrator = Orchestrator::new(config, builder, console, supervisor, rt_rx);

    let summary = orchestrator.run().await?;
    info!(
        rebuilds = summary.rebuilds,
        failed = summary.failed_builds,
        reloads = summary.reloads,
        "bye"
    );
    Ok(())
}
