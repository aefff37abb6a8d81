// src/supervisor/mod.rs

//! Ownership of the single PICO-8 runtime process.
//!
//! [`ProcessSupervisor`] is a two-state machine (Stopped / Running). The live
//! process handle is a private field; the rest of the crate only sees
//! [`RuntimeStatus`]. Output and exit of the process arrive as
//! [`RuntimeEvent`]s on the orchestrator's channel.
//!
//! The Running → Stopped transition is observational: `kill` only requests
//! termination; the state changes when the exit is seen, either through
//! [`ProcessSupervisor::on_exit`] or while awaiting teardown in
//! [`ProcessSupervisor::open`] / [`ProcessSupervisor::shutdown`].

pub mod process;
pub mod reload;

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::engine::{RuntimeEvent, RuntimeId};
use crate::errors::Result;
use crate::platform;
use crate::types::{describe_exit_code, RuntimeStatus};

use self::process::{spawn_runtime, ProcessHandle};
pub use self::reload::{PlatformReload, ReloadNotifier};

#[derive(Debug)]
enum SupervisorState {
    Stopped,
    Running(ProcessHandle),
}

/// Owns at most one runtime process.
pub struct ProcessSupervisor {
    state: SupervisorState,
    next_id: u64,
    event_tx: mpsc::UnboundedSender<RuntimeEvent>,
    notifier: Box<dyn ReloadNotifier>,
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("state", &self.state)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl ProcessSupervisor {
    pub fn new(
        event_tx: mpsc::UnboundedSender<RuntimeEvent>,
        notifier: Box<dyn ReloadNotifier>,
    ) -> Self {
        Self {
            state: SupervisorState::Stopped,
            next_id: 1,
            event_tx,
            notifier,
        }
    }

    pub fn status(&self) -> RuntimeStatus {
        match &self.state {
            SupervisorState::Stopped => RuntimeStatus::Stopped,
            SupervisorState::Running(handle) => RuntimeStatus::Running {
                id: handle.id,
                pid: handle.pid,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SupervisorState::Running(_))
    }

    /// Start the runtime on `config.output`, replacing a live instance.
    ///
    /// The executable is resolved before anything is killed, so a missing
    /// executable leaves a running instance alone. A replaced instance is
    /// fully torn down before the new one is spawned.
    pub async fn open(&mut self, config: &BuildConfig) -> Result<RuntimeId> {
        let executable = match &config.executable {
            Some(path) => path.clone(),
            None => platform::default_executable()?,
        };

        if self.is_running() {
            info!("runtime already running; restarting");
            self.shutdown().await;
        }

        let id = RuntimeId(self.next_id);
        self.next_id += 1;

        let handle = spawn_runtime(id, &executable, &config.output, self.event_tx.clone())?;
        self.state = SupervisorState::Running(handle);
        Ok(id)
    }

    /// Request termination of the live runtime.
    ///
    /// No-op when Stopped. The state stays Running until the exit is
    /// observed. Returns whether a process was running.
    pub fn kill(&mut self) -> bool {
        match &mut self.state {
            SupervisorState::Stopped => {
                debug!("kill requested but no runtime is running");
                false
            }
            SupervisorState::Running(handle) => {
                if handle.request_kill() {
                    info!(id = %handle.id, "kill requested");
                } else {
                    debug!(id = %handle.id, "kill already requested");
                }
                true
            }
        }
    }

    /// Record the exit of process `id`.
    ///
    /// Only the current process moves the supervisor to Stopped; exits of
    /// processes already torn down are ignored. Returns whether the state
    /// changed.
    pub fn on_exit(&mut self, id: RuntimeId, code: Option<i32>) -> bool {
        match &self.state {
            SupervisorState::Running(handle) if handle.id == id => {
                info!(%id, exit_code = %describe_exit_code(code), "runtime stopped");
                self.state = SupervisorState::Stopped;
                true
            }
            _ => {
                debug!(%id, "exit of a runtime that is no longer current");
                false
            }
        }
    }

    /// Notify the live runtime that `cart` was rebuilt.
    ///
    /// Never reaches the notifier while Stopped. Notifier errors are logged.
    pub fn reload(&mut self, cart: &Path) -> bool {
        if !self.is_running() {
            debug!("reload skipped; no runtime is running");
            return false;
        }
        if let Err(err) = self.notifier.notify_reload(cart) {
            warn!(cart = ?cart, error = %err, "reload notification failed");
        }
        true
    }

    /// Kill the live runtime (if any) and wait until it is gone.
    ///
    /// Always leaves the supervisor Stopped.
    pub async fn shutdown(&mut self) {
        let state = std::mem::replace(&mut self.state, SupervisorState::Stopped);
        if let SupervisorState::Running(mut handle) = state {
            let id = handle.id;
            handle.request_kill();
            let code = handle.wait_teardown().await;
            info!(%id, exit_code = %describe_exit_code(code), "runtime torn down");
        }
    }
}
