// src/engine/orchestrator.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::build::Builder;
use crate::config::BuildConfig;
use crate::console::LogSink;
use crate::errors::{CartwatchError, Result};
use crate::supervisor::ProcessSupervisor;
use crate::types::{describe_exit_code, RuntimeStatus};

use super::core::{CoreCommand, CoreRuntime};
use super::report::{format_runtime_output, log_build_failure, log_build_result};
use super::RuntimeEvent;

/// Counters for one watch session, returned by [`Orchestrator::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Builder invocations, including the startup build.
    pub rebuilds: u64,
    pub failed_builds: u64,
    /// Reload notifications sent to a live runtime.
    pub reloads: u64,
    /// Runtime processes successfully spawned.
    pub runtimes_opened: u64,
    /// Supervisor state when the session ended.
    pub final_status: RuntimeStatus,
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self {
            rebuilds: 0,
            failed_builds: 0,
            reloads: 0,
            runtimes_opened: 0,
            final_status: RuntimeStatus::Stopped,
        }
    }
}

/// The control loop.
///
/// Owns the builder, the session log and the process supervisor, and is the
/// only place any of them is touched. Each event received on `event_rx` is
/// handled to completion before the next one is read, so builds never
/// overlap and the supervisor is never used concurrently.
pub struct Orchestrator<B: Builder, L: LogSink> {
    config: BuildConfig,
    builder: B,
    log: L,
    supervisor: ProcessSupervisor,
    core: CoreRuntime,
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    summary: SessionSummary,
}

impl<B: Builder, L: LogSink> fmt::Debug for Orchestrator<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("supervisor", &self.supervisor)
            .field("core", &self.core)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<B: Builder, L: LogSink> Orchestrator<B, L> {
    pub fn new(
        config: BuildConfig,
        builder: B,
        log: L,
        supervisor: ProcessSupervisor,
        event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    ) -> Self {
        Self {
            config,
            builder,
            log,
            supervisor,
            core: CoreRuntime::new(),
            event_rx,
            summary: SessionSummary::default(),
        }
    }

    /// Main event loop.
    ///
    /// - Builds once before reading any event.
    /// - Feeds each event into the core and executes the resulting commands.
    /// - Returns after `Quit`, a fatal stream failure, or when every event
    ///   sender is gone. The runtime is always torn down first.
    pub async fn run(mut self) -> Result<SessionSummary> {
        info!(input = ?self.config.input, output = ?self.config.output, "watch session started");

        self.rebuild();

        let mut fatal: Option<CartwatchError> = None;
        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("event channel closed; ending session");
                    break;
                }
            };

            debug!(?event, "orchestrator received event");

            let step = self.core.step(event);
            for command in step.commands {
                if let Some(err) = self.execute_command(command).await {
                    fatal = Some(err);
                }
            }

            if !step.keep_running {
                break;
            }
        }

        // Covers channel close; a no-op after Quit.
        self.supervisor.shutdown().await;
        self.summary.final_status = self.supervisor.status();
        info!(summary = ?self.summary, "watch session ended");

        match fatal {
            Some(err) => Err(err),
            None => Ok(self.summary),
        }
    }

    /// Execute a single command from the core. Returns the error that ends
    /// the session, if this command is an abort.
    async fn execute_command(&mut self, command: CoreCommand) -> Option<CartwatchError> {
        match command {
            CoreCommand::Rebuild => self.rebuild(),
            CoreCommand::OpenRuntime => self.open_runtime().await,
            CoreCommand::KillRuntime => {
                self.supervisor.kill();
            }
            CoreCommand::ForwardOutput { id, line } => {
                self.log.log(&format_runtime_output(id, &line));
            }
            CoreCommand::ObserveExit { id, code } => {
                self.log
                    .log(&format!("Closed with code: {}", describe_exit_code(code)));
                self.supervisor.on_exit(id, code);
            }
            CoreCommand::Shutdown => {
                self.supervisor.shutdown().await;
            }
            CoreCommand::Abort(fatal) => {
                let err = CartwatchError::from(fatal);
                error!(error = %err, "ending session");
                return Some(err);
            }
        }
        None
    }

    /// Build once, report, and reload a live runtime on success.
    fn rebuild(&mut self) {
        self.summary.rebuilds += 1;
        self.log.clear();

        match self.builder.build(&self.config) {
            Ok(result) => {
                log_build_result(&mut self.log, &result);
                self.log.render();
            }
            Err(err) => {
                self.summary.failed_builds += 1;
                warn!(error = %err, "build failed");
                log_build_failure(&mut self.log, &err);
                self.log.render();
                return;
            }
        }

        if self.supervisor.reload(&self.config.output) {
            self.summary.reloads += 1;
        }
    }

    async fn open_runtime(&mut self) {
        match self.supervisor.open(&self.config).await {
            Ok(id) => {
                self.summary.runtimes_opened += 1;
                debug!(%id, "runtime opened");
            }
            Err(err) => {
                warn!(error = %err, "could not open runtime");
                self.log.log(&format!("Could not open PICO-8: {err}"));
            }
        }
    }
}
