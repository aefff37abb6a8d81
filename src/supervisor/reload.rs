// src/supervisor/reload.rs

//! Live-reload notification for a running PICO-8 instance.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::Stdio;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::debug;

/// Tells a running runtime that the cart at `cart` changed.
///
/// Fire-and-forget: there is no acknowledgement, and the caller only logs
/// errors.
pub trait ReloadNotifier: Send {
    fn notify_reload(&mut self, cart: &Path) -> Result<()>;
}

/// Default notifier.
///
/// - macOS: focus PICO-8 and press Ctrl-R through `osascript`.
/// - elsewhere: bump the cart's modification time, for runtimes that watch
///   the file they were started with. The build has just written the cart,
///   so this is effectively a no-op; stock PICO-8 on Linux and Windows does
///   not reload on its own and needs Ctrl-R pressed in its window.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformReload;

impl ReloadNotifier for PlatformReload {
    fn notify_reload(&mut self, cart: &Path) -> Result<()> {
        if cfg!(target_os = "macos") {
            send_reload_keystroke()
        } else {
            touch(cart)
        }
    }
}

fn send_reload_keystroke() -> Result<()> {
    // Not awaited; tokio reaps the child in the background.
    tokio::process::Command::new("osascript")
        .args([
            "-e",
            r#"tell application "PICO-8" to activate"#,
            "-e",
            r#"tell application "System Events" to keystroke "r" using control down"#,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawning osascript for reload")?;
    debug!("sent reload keystroke to PICO-8");
    Ok(())
}

fn touch(cart: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .append(true)
        .open(cart)
        .with_context(|| format!("opening {:?} for reload", cart))?;
    file.set_modified(SystemTime::now())
        .with_context(|| format!("touching {:?}", cart))?;
    debug!(cart = ?cart, "touched cart for reload");
    Ok(())
}
