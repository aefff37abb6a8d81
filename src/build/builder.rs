// src/build/builder.rs

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::build::cart::{join_sources, new_cart, splice_lua};
use crate::build::{BuildResult, Builder, LuaFile, OutputFile};
use crate::config::BuildConfig;
use crate::errors::{CartwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::SourcePattern;

/// Builds a `.p8` cart from the `*.lua` files directly inside the input
/// directory.
///
/// Sources are ordered by file name, which is also the order of the editor
/// tabs in the resulting cart. An existing cart keeps all of its non-code
/// sections.
#[derive(Debug)]
pub struct CartBuilder<F: FileSystem = RealFileSystem> {
    fs: F,
    pattern: SourcePattern,
}

impl CartBuilder<RealFileSystem> {
    pub fn new() -> Result<Self> {
        Self::with_fs(RealFileSystem)
    }
}

impl<F: FileSystem> CartBuilder<F> {
    pub fn with_fs(fs: F) -> Result<Self> {
        Ok(Self {
            fs,
            pattern: SourcePattern::new()?,
        })
    }

    fn discover_sources(&self, input: &Path) -> anyhow::Result<Vec<LuaFile>> {
        let mut files: Vec<LuaFile> = self
            .fs
            .read_dir(input)?
            .into_iter()
            .filter(|path| self.fs.is_file(path))
            .filter_map(|path| {
                let rel = relative_str(input, &path)?;
                self.pattern.matches(&rel).then(|| LuaFile { name: rel, path })
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn build_inner(&self, config: &BuildConfig) -> anyhow::Result<BuildResult> {
        let lua_files = self
            .discover_sources(&config.input)
            .with_context(|| format!("collecting sources in {:?}", config.input))?;

        let mut sources = Vec::with_capacity(lua_files.len());
        for file in &lua_files {
            sources.push(self.fs.read_to_string(&file.path)?);
        }
        let lua = join_sources(sources.iter().map(String::as_str));

        let output = &config.output;
        let output_file_existed = self.fs.exists(output);
        let cart = if output_file_existed {
            let existing = self.fs.read_to_string(output)?;
            splice_lua(&existing, &lua)
        } else {
            new_cart(&lua)
        };
        self.fs.write(output, cart.as_bytes())?;

        debug!(
            output = ?output,
            bytes = cart.len(),
            existed = output_file_existed,
            "cart written"
        );

        Ok(BuildResult {
            num_lua_files: lua_files.len(),
            lua_files,
            output_file_existed,
            output_file: OutputFile::from_path(output),
        })
    }
}

impl<F: FileSystem> Builder for CartBuilder<F> {
    fn build(&mut self, config: &BuildConfig) -> Result<BuildResult> {
        let result = self
            .build_inner(config)
            .map_err(|err| CartwatchError::BuildFailed(format!("{err:#}")))?;
        info!(
            files = result.num_lua_files,
            output = ?result.output_file.path,
            "cart built"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn config() -> BuildConfig {
        BuildConfig::new("/game/src", "/game/out/game.p8", None)
    }

    #[test]
    fn sources_are_sorted_and_non_lua_files_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("/game/src/2_draw.lua", "function _draw() end");
        fs.add_file("/game/src/notes.txt", "todo");
        fs.add_file("/game/src/1_init.lua", "function _init() end");
        fs.add_file("/game/src/lib/util.lua", "-- nested, not part of the cart");

        let mut builder = CartBuilder::with_fs(fs.clone()).unwrap();
        let result = builder.build(&config()).unwrap();

        let names: Vec<_> = result.lua_files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["1_init.lua", "2_draw.lua"]);
        assert_eq!(result.num_lua_files, 2);
        assert!(!result.output_file_existed);

        let cart = fs.contents("/game/out/game.p8").unwrap();
        assert!(cart.contains("__lua__\nfunction _init() end\n-->8\nfunction _draw() end\n"));
        assert!(!cart.contains("nested"));
    }

    #[test]
    fn missing_input_dir_is_a_build_failure() {
        let fs = MockFileSystem::new();
        let mut builder = CartBuilder::with_fs(fs).unwrap();
        let err = builder.build(&config()).unwrap_err();
        assert!(matches!(err, CartwatchError::BuildFailed(msg) if msg.contains("/game/src")));
    }

    #[test]
    fn unwritable_cart_is_a_build_failure() {
        let fs = MockFileSystem::new();
        fs.add_file("/game/src/main.lua", "print(1)");
        fs.fail_writes_to("/game/out/game.p8");

        let mut builder = CartBuilder::with_fs(fs).unwrap();
        let err = builder.build(&config()).unwrap_err();
        assert!(matches!(err, CartwatchError::BuildFailed(msg) if msg.contains("Permission denied")));
    }

    #[test]
    fn existing_cart_keeps_its_data_sections() {
        let fs = MockFileSystem::new();
        fs.add_file("/game/src/main.lua", "print(2)");
        fs.add_file(
            "/game/out/game.p8",
            "pico-8 cartridge // http://www.pico-8.com\nversion 38\n__lua__\nprint(1)\n__gfx__\n0011\n",
        );

        let mut builder = CartBuilder::with_fs(fs.clone()).unwrap();
        let result = builder.build(&config()).unwrap();

        assert!(result.output_file_existed);
        assert_eq!(result.output_file.name, "game.p8");
        assert_eq!(result.output_file.dir, std::path::PathBuf::from("/game/out"));
        let cart = fs.contents("/game/out/game.p8").unwrap();
        assert!(cart.contains("__lua__\nprint(2)\n__gfx__\n0011\n"));
    }
}
