mod app;
mod config;
mod locate;
pub mod pip;
mod script_bridge;

pub use app::{App, ShellOutput, ShellTemplate};
pub use config::{AppConfig, HostConfig, CONFIG_ENV};
pub use locate::{bin_var, Locator, Platform};
pub use script_bridge::{AppLoader, ScriptBridge};

#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::{fs, os::unix::fs::PermissionsExt, path::PathBuf};

    use tempfile::TempDir;

    /// Write an executable shell script named `name` into `dir`.
    pub fn fake_executable(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
