// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [cart]
/// input = "src"
/// output = "build/game.p8"
/// executable = "/opt/pico-8/pico8"
/// ```
///
/// Every field is optional here because CLI flags may fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub cart: CartSection,
}

/// `[cart]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartSection {
    /// Directory holding the `.lua` sources.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// The `.p8` cartridge to create or update.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Explicit PICO-8 executable; platform discovery is used when absent.
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

impl CartSection {
    /// Overlay values given on the command line; `Some` always wins.
    pub fn override_with(
        &mut self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        executable: Option<PathBuf>,
    ) {
        if input.is_some() {
            self.input = input;
        }
        if output.is_some() {
            self.output = output;
        }
        if executable.is_some() {
            self.executable = executable;
        }
    }

    /// Make relative paths relative to `base` (the config file's directory).
    pub fn rebase(&mut self, base: &Path) {
        for path in [&mut self.input, &mut self.output, &mut self.executable]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Validated configuration for one watch session.
///
/// Immutable for the lifetime of the session; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub executable: Option<PathBuf>,
}

impl BuildConfig {
    /// Construct without validation (tests and programmatic callers).
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        executable: Option<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            executable,
        }
    }
}
