// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::watch::event_handler::process_notify_event;
use crate::watch::patterns::SourcePattern;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    root: PathBuf,
}

impl WatcherHandle {
    /// The (canonicalized) directory being watched.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Watch the input directory (non-recursively) and send
/// `RuntimeEvent::SourceChanged` for every event on a `*.lua` file in it.
///
/// Errors reported by the OS watcher are sent as
/// `RuntimeEvent::WatcherFailed`, which ends the session.
pub fn spawn_watcher(
    input: impl Into<PathBuf>,
    runtime_tx: mpsc::UnboundedSender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = input.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or(root);
    let pattern = SourcePattern::new()?;

    // Called synchronously on notify's own thread.
    let mut watcher = RecommendedWatcher::new(
        {
            let root = root.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    // Err: orchestrator gone, nobody left to notify.
                    let _ = process_notify_event(&root, &pattern, event, &runtime_tx);
                }
                Err(err) => {
                    warn!(error = %err, "file watch error");
                    let _ = runtime_tx.send(RuntimeEvent::WatcherFailed(err.to_string()));
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::NonRecursive)?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle {
        _inner: watcher,
        root,
    })
}
