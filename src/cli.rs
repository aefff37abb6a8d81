// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cartwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cartwatch",
    version,
    about = "Watch Lua sources, rebuild a PICO-8 cart and drive the PICO-8 runtime.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Cartwatch.toml` in the current working directory, used only
    /// if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing the `.lua` sources.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Cartridge to create or update (must end in `.p8`).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Explicit path to the PICO-8 executable.
    ///
    /// If omitted, `pico8` is looked up on PATH and in the usual install
    /// locations.
    #[arg(short, long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Build the cart once and exit, no watching.
    #[arg(long)]
    pub build_only: bool,

    /// Do not read keystrokes; only file changes and Ctrl-C are handled.
    #[arg(long)]
    pub no_input: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CARTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_flags() {
        let args = CliArgs::try_parse_from([
            "cartwatch",
            "--input",
            "src",
            "-o",
            "game.p8",
            "--no-input",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("src")));
        assert_eq!(args.output, Some(PathBuf::from("game.p8")));
        assert!(args.executable.is_none());
        assert!(args.no_input);
        assert!(!args.build_only);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
