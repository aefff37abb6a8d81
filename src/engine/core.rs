// src/engine/core.rs

//! Pure core state machine.
//!
//! [`CoreRuntime::step`] turns one [`RuntimeEvent`] into the list of
//! [`CoreCommand`]s the orchestrator must carry out, plus whether the loop
//! keeps going. It has no channels, no Tokio types and performs no IO, so
//! the event semantics can be unit tested on their own.

use crate::engine::{Command, RuntimeEvent, RuntimeId};
use crate::errors::CartwatchError;

/// Work the orchestrator performs for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run the builder once (and reload a live runtime on success).
    Rebuild,
    OpenRuntime,
    /// Kill the live runtime; a no-op when nothing runs.
    KillRuntime,
    /// Show a line of runtime output, tagged with its process.
    ForwardOutput { id: RuntimeId, line: String },
    /// Report a process exit and let the supervisor observe it.
    ObserveExit { id: RuntimeId, code: Option<i32> },
    /// Kill the live runtime and wait until it is gone.
    Shutdown,
    /// End the session with an error.
    Abort(Fatal),
}

/// Session-ending failure of an event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fatal {
    Watcher(String),
    Input(String),
}

impl From<Fatal> for CartwatchError {
    fn from(fatal: Fatal) -> Self {
        match fatal {
            Fatal::Watcher(msg) => CartwatchError::WatcherFailed(msg),
            Fatal::Input(msg) => CartwatchError::InputFailed(msg),
        }
    }
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the orchestrator loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn stop(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Pure core runtime.
///
/// Once a stopping step has been produced, every later event is ignored.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    finished: bool,
}

impl CoreRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        if self.finished {
            return CoreStep::stop(Vec::new());
        }

        let step = match event {
            RuntimeEvent::SourceChanged { .. } => CoreStep::run(vec![CoreCommand::Rebuild]),
            RuntimeEvent::Command(command) => Self::command_step(command),
            RuntimeEvent::RuntimeOutput { id, line } => {
                CoreStep::run(vec![CoreCommand::ForwardOutput { id, line }])
            }
            RuntimeEvent::RuntimeExited { id, code } => {
                CoreStep::run(vec![CoreCommand::ObserveExit { id, code }])
            }
            RuntimeEvent::WatcherFailed(msg) => CoreStep::stop(vec![
                CoreCommand::Shutdown,
                CoreCommand::Abort(Fatal::Watcher(msg)),
            ]),
            RuntimeEvent::InputFailed(msg) => CoreStep::stop(vec![
                CoreCommand::Shutdown,
                CoreCommand::Abort(Fatal::Input(msg)),
            ]),
        };

        if !step.keep_running {
            self.finished = true;
        }
        step
    }

    fn command_step(command: Command) -> CoreStep {
        match command {
            Command::Rebuild => CoreStep::run(vec![CoreCommand::Rebuild]),
            Command::OpenRuntime => CoreStep::run(vec![CoreCommand::OpenRuntime]),
            Command::KillRuntime => CoreStep::run(vec![CoreCommand::KillRuntime]),
            Command::Quit => CoreStep::stop(vec![CoreCommand::Shutdown]),
        }
    }
}
