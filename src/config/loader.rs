// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{BuildConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; relative paths are rebased onto
/// the file's directory but nothing is validated yet.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    config.cart.rebase(&config_root_dir(path));

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let raw_config = load_from_path(&path)?;
    BuildConfig::try_from(raw_config)
}

/// Merge the optional config file with CLI flags into a validated
/// [`BuildConfig`].
///
/// - `--config PATH` must point at a readable file.
/// - Without `--config`, [`default_config_path`] is used only if it exists.
/// - CLI `--input/--output/--executable` override file values.
pub fn resolve_build_config(args: &CliArgs) -> Result<BuildConfig> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                debug!(?path, "using default config file");
                load_from_path(&path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    raw.cart.override_with(
        args.input.clone(),
        args.output.clone(),
        args.executable.clone(),
    );

    BuildConfig::try_from(raw)
}

/// Default config location: `Cartwatch.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Cartwatch.toml")
}

/// Directory that relative paths in a config file are resolved against.
///
/// A bare file name (parent = "") means the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
