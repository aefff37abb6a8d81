// src/watch/mod.rs

//! File watching for cart sources.
//!
//! This module is responsible for:
//! - The `*.lua` source pattern shared with the builder.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Translating raw filesystem events into `RuntimeEvent::SourceChanged`.
//!
//! It does not decide what a change means; the orchestrator does.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{SourcePattern, SOURCE_GLOB};
pub use watcher::{spawn_watcher, WatcherHandle};
