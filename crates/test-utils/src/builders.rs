#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cartwatch::config::BuildConfig;
use tempfile::TempDir;

/// A throwaway cart project: `<tmp>/src/*.lua` and `<tmp>/out/game.p8`.
pub struct CartProject {
    dir: TempDir,
    executable: Option<PathBuf>,
}

impl CartProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("creating temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("creating src dir");
        Self {
            dir,
            executable: None,
        }
    }

    pub fn with_source(self, name: &str, contents: &str) -> Self {
        fs::write(self.input().join(name), contents).expect("writing source");
        self
    }

    pub fn with_existing_cart(self, contents: &str) -> Self {
        let output = self.output();
        fs::create_dir_all(output.parent().unwrap()).expect("creating out dir");
        fs::write(&output, contents).expect("writing cart");
        self
    }

    /// Use a fake runtime script (see [`write_runtime_script`]).
    #[cfg(unix)]
    pub fn with_fake_runtime(mut self) -> Self {
        self.executable = Some(write_runtime_script(self.dir.path()));
        self
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("out").join("game.p8")
    }

    pub fn config(&self) -> BuildConfig {
        BuildConfig::new(self.input(), self.output(), self.executable.clone())
    }

    pub fn cart_contents(&self) -> String {
        fs::read_to_string(self.output()).expect("reading cart")
    }
}

impl Default for CartProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a stand-in for the PICO-8 binary.
///
/// Invoked as `<script> -run <cart>`, it prints `running <cart>` and then
/// becomes a long `sleep`, so killing its pid ends it immediately.
#[cfg(unix)]
pub fn write_runtime_script(dir: &Path) -> PathBuf {
    write_script(dir, "fake-pico8", "#!/bin/sh\necho \"running $2\"\nexec sleep 30\n")
}

/// A runtime that prints one line and exits with `code` on its own.
#[cfg(unix)]
pub fn write_exiting_runtime_script(dir: &Path, code: i32) -> PathBuf {
    write_script(
        dir,
        "exiting-pico8",
        &format!("#!/bin/sh\necho \"bye $2\"\nexit {code}\n"),
    )
}

/// A runtime that prints `stopping` and exits 0 when sent SIGTERM.
#[cfg(unix)]
pub fn write_trapping_runtime_script(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "trapping-pico8",
        "#!/bin/sh\ntrap 'echo stopping; exit 0' TERM\necho \"running $2\"\nwhile :; do sleep 0.1; done\n",
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).expect("writing runtime script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod runtime script");
    path
}
