use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use yurlungur_core::{HostKind, Result, YurlungurError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Mac,
}

impl Default for Platform {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }
}

impl Platform {
    /// File name of a program on this platform.
    pub fn executable_name(&self, program: &str) -> String {
        match self {
            Platform::Windows if Path::new(program).extension().is_none() => {
                format!("{program}.exe")
            }
            _ => program.to_owned(),
        }
    }

    /// Glob patterns (with `{exe}` for the escaped file name) covering where
    /// the DCC installers put their binaries.
    fn install_patterns(&self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &[
                "C:/Program Files/*/{exe}",
                "C:/Program Files/*/*/{exe}",
                "C:/Program Files/*/*/bin/{exe}",
                "C:/Program Files/*/*/Engine/Binaries/Win64/{exe}",
            ],
            Platform::Mac => &[
                "/Applications/*/Contents/MacOS/{exe}",
                "/Applications/*/*/Contents/MacOS/{exe}",
                "/Applications/*/*/Contents/bin/{exe}",
                "/Applications/*/bin/{exe}",
            ],
            Platform::Linux => &[
                "/opt/*/bin/{exe}",
                "/opt/*/{exe}",
                "/usr/autodesk/*/bin/{exe}",
            ],
        }
    }
}

/// Finds host executables on disk.
///
/// Search order: explicit path, `YURLUNGUR_<HOST>_BIN`, the directory of the
/// running executable, `PATH`, then the platform's install roots.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    platform: Platform,
    bin_vars: BTreeMap<HostKind, PathBuf>,
    sibling_dir: Option<PathBuf>,
    search_path: Vec<PathBuf>,
    install_roots: bool,
}

impl Locator {
    pub fn from_env() -> Self {
        let bin_vars = HostKind::all()
            .filter_map(|kind| env::var_os(bin_var(kind)).map(|path| (kind, PathBuf::from(path))))
            .collect();
        let sibling_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_owned));
        let search_path = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();
        Self {
            platform: Platform::default(),
            bin_vars,
            sibling_dir,
            search_path,
            install_roots: true,
        }
    }

    /// A locator that only looks at the explicit path and what is added with the
    /// `with_*` methods.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    pub fn with_bin_var(mut self, kind: HostKind, path: impl Into<PathBuf>) -> Self {
        self.bin_vars.insert(kind, path.into());
        self
    }

    pub fn with_search_path(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_path.extend(dirs);
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Locate `program` for `kind`. Fails with
    /// [`YurlungurError::ExecutableNotFound`] listing every place looked at.
    pub fn find(&self, kind: HostKind, program: &str, explicit: Option<&Path>) -> Result<PathBuf> {
        let exe = self.platform.executable_name(program);
        let mut candidates = Vec::new();

        let mut direct = Vec::new();
        if let Some(path) = explicit {
            direct.push(path.to_owned());
        }
        if let Some(path) = self.bin_vars.get(&kind) {
            // The variable may name the binary itself or its directory
            if path.is_dir() {
                direct.push(path.join(&exe));
            } else {
                direct.push(path.clone());
            }
        }
        direct.extend(self.sibling_dir.iter().map(|dir| dir.join(&exe)));
        direct.extend(self.search_path.iter().map(|dir| dir.join(&exe)));

        for path in direct {
            if path.is_file() {
                tracing::debug!("Found {} for {} at {}", program, kind, path.display());
                return Ok(path);
            }
            candidates.push(path.display().to_string());
        }

        if self.install_roots {
            let escaped = Pattern::escape(&exe);
            for pattern in self.platform.install_patterns() {
                let pattern = pattern.replace("{exe}", &escaped);
                // Sorted by name, so the last match is usually the newest version
                let found = glob::glob(&pattern)?
                    .filter_map(|entry| entry.ok())
                    .filter(|path| path.is_file())
                    .last();
                if let Some(path) = found {
                    tracing::debug!("Found {} for {} at {}", program, kind, path.display());
                    return Ok(path);
                }
                candidates.push(pattern);
            }
        }

        Err(YurlungurError::ExecutableNotFound {
            host: kind,
            candidates,
        })
    }
}

/// `YURLUNGUR_<HOST>_BIN`
pub fn bin_var(kind: HostKind) -> String {
    format!("YURLUNGUR_{}_BIN", kind.name().to_uppercase())
}
