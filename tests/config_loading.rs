// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use cartwatch::cli::CliArgs;
use cartwatch::config::{load_and_validate, resolve_build_config};
use cartwatch::errors::CartwatchError;
use cartwatch_test_utils::builders::CartProject;

fn args() -> CliArgs {
    CliArgs {
        config: None,
        input: None,
        output: None,
        executable: None,
        build_only: false,
        no_input: false,
        log_level: None,
    }
}

#[test]
fn relative_paths_resolve_against_the_config_file() {
    let project = CartProject::new();
    let path = project.root().join("Cartwatch.toml");
    std::fs::write(
        &path,
        "[cart]\ninput = \"src\"\noutput = \"out/game.p8\"\nexecutable = \"/opt/pico-8/pico8\"\n",
    )
    .unwrap();

    let config = load_and_validate(&path).unwrap();

    assert_eq!(config.input, project.input());
    assert_eq!(config.output, project.output());
    assert_eq!(config.executable, Some(PathBuf::from("/opt/pico-8/pico8")));
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[cart]\ninput = \"src\"\noutput = \"game.p8\"\nwatch = true\n").unwrap();

    match load_and_validate(file.path()) {
        Err(CartwatchError::TomlError(e)) => assert!(e.to_string().contains("watch")),
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn output_must_be_a_p8_file() {
    let project = CartProject::new();
    let mut a = args();
    a.input = Some(project.input());
    a.output = Some(project.root().join("game.png"));

    match resolve_build_config(&a) {
        Err(CartwatchError::ConfigError(msg)) => assert!(msg.contains(".p8")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn cli_flags_override_the_config_file() {
    let project = CartProject::new();
    let path = project.root().join("Cartwatch.toml");
    std::fs::write(&path, "[cart]\ninput = \"src\"\noutput = \"old.p8\"\n").unwrap();

    let mut a = args();
    a.config = Some(path);
    a.output = Some(project.output());

    let config = resolve_build_config(&a).unwrap();
    assert_eq!(config.input, project.input());
    assert_eq!(config.output, project.output());
    assert_eq!(config.executable, None);
}
