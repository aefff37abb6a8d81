// src/engine/mod.rs

//! Orchestration engine for cartwatch.
//!
//! One control task reacts to:
//! - source file changes from the watcher
//! - keyboard commands
//! - output and exit events of the PICO-8 process
//! - fatal watcher / keyboard failures
//!
//! Events are handled strictly one at a time. The pure mapping from event to
//! work lives in [`core`]; the async shell that owns the builder, the log
//! and the process supervisor is [`orchestrator`].

use std::path::PathBuf;

pub use crate::types::{ChangeKind, Command, RuntimeId};

/// Events flowing into the orchestrator from watcher, keyboard and process
/// monitor tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A watched source file was added, modified or removed.
    SourceChanged { path: PathBuf, kind: ChangeKind },
    /// A manual command (keyboard or Ctrl-C).
    Command(Command),
    /// One line of stdout from a runtime process.
    RuntimeOutput { id: RuntimeId, line: String },
    /// A runtime process terminated, for whatever reason.
    RuntimeExited { id: RuntimeId, code: Option<i32> },
    /// The file watcher can no longer deliver events.
    WatcherFailed(String),
    /// The keyboard can no longer be read.
    InputFailed(String),
}

pub mod core;
pub mod orchestrator;
pub mod report;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep, Fatal};
pub use orchestrator::{Orchestrator, SessionSummary};
