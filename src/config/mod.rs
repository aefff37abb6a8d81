// src/config/mod.rs

//! Configuration loading and validation for cartwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate paths before a session starts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_build_config};
pub use model::{BuildConfig, CartSection, RawConfigFile};
pub use validate::validate_config;
