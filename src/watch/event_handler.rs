// src/watch/event_handler.rs

//! Turning `notify` events into source change notifications.

use std::path::Path;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::Event;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::RuntimeEvent;
use crate::types::ChangeKind;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::SourcePattern;

/// Classify a `notify` event kind. `None` means "not a content change"
/// (access, metadata-only, unknown).
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Added),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(ChangeKind::Added),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Send one `SourceChanged` per path of `event` that names a cart source.
///
/// No deduplication: an editor that saves in two steps causes two
/// notifications, and therefore two rebuilds. Returns how many
/// notifications were sent; `Err` if the orchestrator is gone.
pub fn process_notify_event(
    root: &Path,
    pattern: &SourcePattern,
    event: Event,
    runtime_tx: &mpsc::UnboundedSender<RuntimeEvent>,
) -> Result<usize, mpsc::error::SendError<RuntimeEvent>> {
    let Some(kind) = change_kind(&event.kind) else {
        return Ok(0);
    };

    let mut sent = 0;
    for path in event.paths {
        let Some(rel) = relative_str(root, &path) else {
            warn!("could not relativize path {:?} against root {:?}", path, root);
            continue;
        };
        if !pattern.matches(&rel) {
            continue;
        }

        debug!(rel = %rel, ?kind, "source changed");
        runtime_tx.send(RuntimeEvent::SourceChanged { path, kind })?;
        sent += 1;
    }
    Ok(sent)
}
