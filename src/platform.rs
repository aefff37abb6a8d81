// src/platform.rs

//! Locating the PICO-8 executable when none is configured.

use std::path::PathBuf;

use tracing::debug;

use crate::errors::{CartwatchError, Result};

/// Names tried on `PATH`, in order.
const EXECUTABLE_NAMES: &[&str] = &["pico8", "pico-8"];

/// Resolve the PICO-8 executable: `PATH` first, then the usual install
/// location for this platform.
pub fn default_executable() -> Result<PathBuf> {
    for name in EXECUTABLE_NAMES {
        if let Ok(path) = which::which(name) {
            debug!(?path, "found PICO-8 on PATH");
            return Ok(path);
        }
    }

    for candidate in install_locations() {
        if candidate.is_file() {
            debug!(path = ?candidate, "found PICO-8 in install location");
            return Ok(candidate);
        }
    }

    Err(CartwatchError::ExecutableNotFound)
}

#[cfg(target_os = "macos")]
fn install_locations() -> Vec<PathBuf> {
    vec![PathBuf::from("/Applications/PICO-8.app/Contents/MacOS/pico8")]
}

#[cfg(windows)]
fn install_locations() -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files (x86)\PICO-8\pico8.exe"),
        PathBuf::from(r"C:\Program Files\PICO-8\pico8.exe"),
    ]
}

#[cfg(not(any(target_os = "macos", windows)))]
fn install_locations() -> Vec<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| vec![home.join("pico-8").join("pico8")])
        .unwrap_or_default()
}
