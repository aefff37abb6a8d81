// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("PICO-8 executable not found (pass --executable or set [cart].executable)")]
    ExecutableNotFound,

    #[error("Failed to spawn runtime {path:?}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File watcher failed: {0}")]
    WatcherFailed(String),

    #[error("Keyboard input failed: {0}")]
    InputFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<notify::Error> for CartwatchError {
    fn from(err: notify::Error) -> Self {
        CartwatchError::WatcherFailed(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CartwatchError>;
