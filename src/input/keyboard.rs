// src/input/keyboard.rs

//! Raw-mode keystroke reader.

use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::errors::{CartwatchError, Result};
use crate::input::command_for_key;

/// How often the reader wakes up to check whether the session ended.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keeps the terminal in raw mode; restores it on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| {
            CartwatchError::InputFailed(format!(
                "enabling raw mode: {e} (use --no-input if stdin is not a terminal)"
            ))
        })?;
        debug!("terminal raw mode enabled");
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if terminal::disable_raw_mode().is_ok() {
            debug!("terminal raw mode disabled");
        }
    }
}

/// Read keystrokes on a blocking thread and send bound commands as
/// [`RuntimeEvent::Command`].
///
/// A read error is reported once as [`RuntimeEvent::InputFailed`]. The
/// reader stops when that happens or when the orchestrator drops its
/// receiver.
pub fn spawn_keyboard_reader(runtime_tx: mpsc::UnboundedSender<RuntimeEvent>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        info!("keyboard reader started");

        while !runtime_tx.is_closed() {
            let ready = match event::poll(POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(e) => {
                    let _ = runtime_tx.send(RuntimeEvent::InputFailed(e.to_string()));
                    break;
                }
            };
            if !ready {
                continue;
            }

            match event::read() {
                Ok(Event::Key(key)) => {
                    let Some(command) = command_for_key(&key) else {
                        continue;
                    };
                    debug!(?command, "key command");
                    if runtime_tx.send(RuntimeEvent::Command(command)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = runtime_tx.send(RuntimeEvent::InputFailed(e.to_string()));
                    break;
                }
            }
        }

        debug!("keyboard reader finished");
    })
}
