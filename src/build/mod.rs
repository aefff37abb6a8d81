// src/build/mod.rs

//! Cart building.
//!
//! The engine only sees the [`Builder`] trait: a synchronous call from a
//! [`BuildConfig`] to a [`BuildResult`] or an error. [`CartBuilder`] is the
//! production implementation that splices Lua sources into a `.p8` file.

pub mod builder;
pub mod cart;

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::errors::Result;

pub use builder::CartBuilder;

/// A source file that went into the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuaFile {
    pub name: String,
    pub path: PathBuf,
}

/// The cart a build wrote to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    /// Containing directory; `.` for a bare file name.
    pub dir: PathBuf,
    pub name: String,
}

impl OutputFile {
    pub fn from_path(path: &Path) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            dir,
            name,
        }
    }
}

/// Outcome of one successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub num_lua_files: usize,
    /// In discovery order.
    pub lua_files: Vec<LuaFile>,
    /// Whether the cart existed before this build (updated vs created).
    pub output_file_existed: bool,
    pub output_file: OutputFile,
}

/// Turns the sources named by a [`BuildConfig`] into a cart.
///
/// Implementations run to completion synchronously and keep no state the
/// engine depends on; tests substitute counting or failing builders.
pub trait Builder: Send {
    fn build(&mut self, config: &BuildConfig) -> Result<BuildResult>;
}
