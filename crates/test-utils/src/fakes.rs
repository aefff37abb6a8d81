use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cartwatch::build::{BuildResult, Builder, OutputFile};
use cartwatch::config::BuildConfig;
use cartwatch::console::LogSink;
use cartwatch::errors::{CartwatchError, Result};
use cartwatch::supervisor::ReloadNotifier;

/// Ordered record of builder and reload activity, shared between fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Build,
    Reload(PathBuf),
}

pub type Timeline = Arc<Mutex<Vec<Step>>>;

pub fn timeline() -> Timeline {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn steps(timeline: &Timeline) -> Vec<Step> {
    timeline.lock().unwrap().clone()
}

/// A builder that:
/// - records each call on the timeline
/// - returns an empty successful result, or a failure when `failing`.
pub struct FakeBuilder {
    timeline: Timeline,
    failing: bool,
}

impl FakeBuilder {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            failing: false,
        }
    }

    pub fn failing(timeline: Timeline) -> Self {
        Self {
            timeline,
            failing: true,
        }
    }
}

impl Builder for FakeBuilder {
    fn build(&mut self, config: &BuildConfig) -> Result<BuildResult> {
        self.timeline.lock().unwrap().push(Step::Build);
        if self.failing {
            return Err(CartwatchError::BuildFailed("syntax error near 'end'".into()));
        }
        Ok(BuildResult {
            num_lua_files: 0,
            lua_files: Vec::new(),
            output_file_existed: true,
            output_file: OutputFile::from_path(&config.output),
        })
    }
}

/// Records reload notifications on the timeline.
pub struct RecordingReload {
    timeline: Timeline,
}

impl RecordingReload {
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }
}

impl ReloadNotifier for RecordingReload {
    fn notify_reload(&mut self, cart: &Path) -> anyhow::Result<()> {
        self.timeline
            .lock()
            .unwrap()
            .push(Step::Reload(cart.to_path_buf()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Clear,
    Line(String),
    Render,
}

/// Log sink that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for RecordingLog {
    fn clear(&mut self) {
        self.entries.lock().unwrap().push(LogEntry::Clear);
    }

    fn log(&mut self, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(LogEntry::Line(message.to_string()));
    }

    fn render(&mut self) {
        self.entries.lock().unwrap().push(LogEntry::Render);
    }
}
