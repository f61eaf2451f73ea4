//! Works out which host application this process runs in.
//!
//! Detection looks at two signals only: the path of the interpreter executable
//! and the set of host modules the embedding application reports as loaded.
//! Whether a host is actually usable is decided by a [`ModuleLoader`], the
//! counterpart of "the native module imports successfully".

use std::{collections::BTreeSet, env, path::PathBuf, sync::Arc};

use crate::{HostBridge, HostKind, HostSession, Result, YurlungurError};

/// Environment variable listing already-loaded host modules, comma separated.
pub const MODULES_ENV: &str = "YURLUNGUR_MODULES";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    pub executable: PathBuf,
    pub modules: BTreeSet<String>,
}

impl ProcessEnv {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            modules: BTreeSet::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.modules.insert(module.into());
        self
    }

    /// Read the signals of the current process. Never fails: an unreadable
    /// executable path is left empty.
    pub fn current() -> Self {
        let executable = env::current_exe().unwrap_or_default();
        let modules = env::var(MODULES_ENV)
            .map(|value| parse_modules(&value))
            .unwrap_or_default();
        Self {
            executable,
            modules,
        }
    }

    /// Whether the host's module, or its top-level package, is loaded.
    pub fn has_module(&self, kind: HostKind) -> bool {
        let Some(module) = kind.module() else {
            return false;
        };
        let package = module.split('.').next().unwrap_or(module);
        self.modules.contains(module) || self.modules.contains(package)
    }
}

fn parse_modules(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolves a host's native module to a bridge.
pub trait ModuleLoader {
    /// Returns `None` when the host's module cannot be reached.
    fn import(&self, kind: HostKind) -> Option<Arc<dyn HostBridge>>;
}

/// Whether the process signals point at `kind`. Hosts with an executable marker
/// are recognised by it; the rest by their module being loaded.
fn signals(env: &ProcessEnv, kind: HostKind) -> bool {
    match kind.executable_marker() {
        Some(_) => kind.matches_executable(&env.executable),
        None => env.has_module(kind),
    }
}

/// Resolve the session for a process environment.
///
/// Hosts are probed in [`HostKind::DETECTION_ORDER`]; the first host whose
/// signals match and whose module the loader can import wins. If none does, the
/// standalone session is returned. Detection never fails.
pub fn detect(env: &ProcessEnv, loader: &dyn ModuleLoader) -> HostSession {
    for kind in HostKind::DETECTION_ORDER {
        if !signals(env, kind) {
            continue;
        }
        match loader.import(kind) {
            Some(bridge) => {
                tracing::info!("Detected host {} ({})", kind, env.executable.display());
                return HostSession::new(kind, bridge);
            }
            None => {
                tracing::debug!("{} matched but its module could not be imported", kind);
            }
        }
    }

    tracing::debug!(
        "No host detected for {}, running standalone",
        env.executable.display()
    );
    HostSession::standalone()
}

/// Force a host by name (short name or module name).
///
/// `"standalone"` always succeeds. Any other host must be importable through the
/// loader, otherwise this fails with [`YurlungurError::ModuleNotFound`].
pub fn use_host(name: &str, loader: &dyn ModuleLoader) -> Result<HostSession> {
    let kind = HostKind::from_name(name)?;
    if kind == HostKind::Standalone {
        return Ok(HostSession::standalone());
    }
    let bridge = loader.import(kind).ok_or_else(|| {
        YurlungurError::ModuleNotFound(kind.module().unwrap_or(kind.name()).to_owned())
    })?;
    tracing::info!("Using host {}", kind);
    Ok(HostSession::new(kind, bridge))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::hosts::testing::RecordingBridge;

    /// Imports exactly the listed hosts.
    #[derive(Default)]
    struct FakeLoader {
        importable: HashMap<HostKind, Arc<RecordingBridge>>,
    }

    impl FakeLoader {
        fn with(mut self, kind: HostKind) -> Self {
            self.importable.insert(kind, RecordingBridge::new());
            self
        }
    }

    impl ModuleLoader for FakeLoader {
        fn import(&self, kind: HostKind) -> Option<Arc<dyn HostBridge>> {
            self.importable
                .get(&kind)
                .map(|bridge| Arc::clone(bridge) as Arc<dyn HostBridge>)
        }
    }

    #[test_log::test]
    fn test_blender_executable_with_bpy() {
        let env = ProcessEnv::new("/Applications/Blender.app/Contents/MacOS/Blender");
        let loader = FakeLoader::default().with(HostKind::Blender);
        *loader.importable[&HostKind::Blender].shell_output.lock().unwrap() = Some("2".to_owned());

        let session = detect(&env, &loader);
        assert_eq!(session.kind(), HostKind::Blender);
        assert_eq!(session.shell("print(2)").unwrap(), "2");
    }

    #[test_log::test]
    fn test_marker_without_module_falls_through() {
        let env = ProcessEnv::new("/usr/autodesk/maya2024/bin/maya.bin");
        let loader = FakeLoader::default();
        assert_eq!(detect(&env, &loader).kind(), HostKind::Standalone);
    }

    #[test_log::test]
    fn test_module_only_hosts() {
        let env = ProcessEnv::new("/opt/hfs20.0/bin/hython").with_module("hou");
        let loader = FakeLoader::default().with(HostKind::Houdini);
        assert_eq!(detect(&env, &loader).kind(), HostKind::Houdini);

        // Importable but not loaded is not enough
        let env = ProcessEnv::new("/usr/bin/python3");
        assert_eq!(detect(&env, &loader).kind(), HostKind::Standalone);
    }

    #[test_log::test]
    fn test_priority_order() {
        // Both Maya and RenderDoc qualify; Maya comes first
        let env = ProcessEnv::new("/usr/autodesk/maya2024/bin/mayapy").with_module("renderdoc");
        let loader = FakeLoader::default()
            .with(HostKind::Maya)
            .with(HostKind::RenderDoc);
        assert_eq!(detect(&env, &loader).kind(), HostKind::Maya);

        let loader = FakeLoader::default().with(HostKind::RenderDoc);
        assert_eq!(detect(&env, &loader).kind(), HostKind::RenderDoc);
    }

    #[test_log::test]
    fn test_detection_is_deterministic() {
        let env = ProcessEnv::new("C:/Program Files/Nuke14.0v5/Nuke14.0.exe");
        let loader = FakeLoader::default().with(HostKind::Nuke);
        let first = detect(&env, &loader).kind();
        for _ in 0..3 {
            assert_eq!(detect(&env, &loader).kind(), first);
        }
        assert_eq!(first, HostKind::Nuke);
    }

    #[test_log::test]
    fn test_nothing_detected_is_standalone() {
        let env = ProcessEnv::new("/usr/bin/python3");
        let loader = FakeLoader::default();
        let session = detect(&env, &loader);
        assert!(session.is_standalone());
        let err = session
            .file()
            .abc_importer("/a.abc", Vec::new())
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_use_host() {
        let loader = FakeLoader::default().with(HostKind::Houdini);
        assert_eq!(use_host("hou", &loader).unwrap().kind(), HostKind::Houdini);
        assert!(use_host("standalone", &loader).unwrap().is_standalone());
        assert!(matches!(
            use_host("maya", &loader),
            Err(YurlungurError::ModuleNotFound(m)) if m == "maya.cmds"
        ));
        assert!(matches!(
            use_host("photoshop", &loader),
            Err(YurlungurError::UnknownHost(_))
        ));
    }

    #[test]
    fn test_parse_modules() {
        let modules = parse_modules(" hou, renderdoc ,,");
        assert_eq!(
            modules.into_iter().collect::<Vec<_>>(),
            vec!["hou".to_owned(), "renderdoc".to_owned()]
        );
    }

    #[test]
    fn test_has_module_accepts_package() {
        let env = ProcessEnv::new("").with_module("sd");
        assert!(env.has_module(HostKind::SubstanceDesigner));
        assert!(!env.has_module(HostKind::Standalone));
    }
}
