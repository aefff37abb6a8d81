use std::fmt;

/// Manual control commands, produced by the keyboard (or Ctrl-C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Rebuild the cart now.
    Rebuild,
    /// Open the runtime, replacing any instance that is already running.
    OpenRuntime,
    /// Kill the running runtime, if any.
    KillRuntime,
    /// Kill the runtime and end the session.
    Quit,
}

impl Command {
    /// Short label used in the key help line.
    pub fn label(self) -> &'static str {
        match self {
            Command::Rebuild => "build",
            Command::OpenRuntime => "open",
            Command::KillRuntime => "kill",
            Command::Quit => "quit",
        }
    }
}

/// What happened to a watched source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// Session-local identity of one spawned runtime process.
///
/// Ids are never reused within a session, so events from a process that was
/// already replaced can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(pub u64);

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable state of the runtime supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    Stopped,
    Running { id: RuntimeId, pid: Option<u32> },
}

impl RuntimeStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RuntimeStatus::Running { .. })
    }

    pub fn id(&self) -> Option<RuntimeId> {
        match self {
            RuntimeStatus::Running { id, .. } => Some(*id),
            RuntimeStatus::Stopped => None,
        }
    }
}

/// Render an optional exit code the way the session log shows it.
pub fn describe_exit_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

