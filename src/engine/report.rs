// src/engine/report.rs

//! Human-readable build summaries for the session log.

use std::path::MAIN_SEPARATOR;

use owo_colors::{OwoColorize, Stream::Stdout};

use crate::build::BuildResult;
use crate::console::LogSink;
use crate::engine::RuntimeId;

/// Log what a build did. Does not clear or render.
pub fn log_build_result(log: &mut dyn LogSink, result: &BuildResult) {
    let count = result.num_lua_files.to_string();
    log.log(&format!(
        "Found {} lua files:",
        count.if_supports_color(Stdout, |t| t.magenta())
    ));
    for file in &result.lua_files {
        log.log(&format!(
            "   • {}",
            file.name.if_supports_color(Stdout, |t| t.magenta())
        ));
    }

    let heading = if result.output_file_existed {
        "Copied into:"
    } else {
        "Created new cart:"
    };
    log.log("");
    log.log(heading);
    log.log(&format!(
        "   {}{}{}",
        result.output_file.dir.display(),
        MAIN_SEPARATOR,
        result
            .output_file
            .name
            .if_supports_color(Stdout, |t| t.yellow())
    ));
}

/// Log a failed build.
pub fn log_build_failure(log: &mut dyn LogSink, error: &dyn std::fmt::Display) {
    log.log(&format!(
        "{} {error}",
        "Build failed:".if_supports_color(Stdout, |t| t.red())
    ));
}

/// One line of runtime output, tagged with the process it came from.
pub fn format_runtime_output(id: RuntimeId, line: &str) -> String {
    format!("{} {id} -> {line}", "PICO-8".if_supports_color(Stdout, |t| t.cyan()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{LuaFile, OutputFile};
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct Lines(Vec<String>);

    impl LogSink for Lines {
        fn clear(&mut self) {
            self.0.clear();
        }
        fn log(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
        fn render(&mut self) {}
    }

    fn result(existed: bool) -> BuildResult {
        BuildResult {
            num_lua_files: 1,
            lua_files: vec![LuaFile {
                name: "main.lua".into(),
                path: PathBuf::from("src/main.lua"),
            }],
            output_file_existed: existed,
            output_file: OutputFile::from_path(Path::new("carts/game.p8")),
        }
    }

    #[test]
    fn new_cart_summary() {
        owo_colors::set_override(false);
        let mut lines = Lines::default();
        log_build_result(&mut lines, &result(false));
        let expected_path = format!("   carts{MAIN_SEPARATOR}game.p8");
        assert_eq!(
            lines.0,
            vec![
                "Found 1 lua files:".to_string(),
                "   • main.lua".to_string(),
                String::new(),
                "Created new cart:".to_string(),
                expected_path,
            ]
        );
    }

    #[test]
    fn existing_cart_summary_says_copied() {
        owo_colors::set_override(false);
        let mut lines = Lines::default();
        log_build_result(&mut lines, &result(true));
        assert!(lines.0.contains(&"Copied into:".to_string()));
        assert!(!lines.0.iter().any(|l| l.contains("Created")));
    }

    #[test]
    fn runtime_output_is_tagged() {
        owo_colors::set_override(false);
        assert_eq!(format_runtime_output(RuntimeId(2), "hello"), "PICO-8 #2 -> hello");
    }
}
