// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Sources that make up a cart: Lua files directly inside the input dir.
pub const SOURCE_GLOB: &str = "*.lua";

/// Compiled source pattern, evaluated against paths relative to the input
/// directory (e.g. `"main.lua"`).
///
/// `*` never crosses a `/`, so files in subdirectories do not match.
#[derive(Clone)]
pub struct SourcePattern {
    set: GlobSet,
}

impl fmt::Debug for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePattern")
            .field("glob", &SOURCE_GLOB)
            .finish_non_exhaustive()
    }
}

impl SourcePattern {
    pub fn new() -> Result<Self> {
        let set = build_globset(&[SOURCE_GLOB])?;
        Ok(Self { set })
    }

    /// Returns true if the relative path names a cart source, e.g.
    /// `"player.lua"` but not `"lib/util.lua"` or `"notes.txt"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
