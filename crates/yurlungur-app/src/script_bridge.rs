use std::sync::Arc;

use serde_json::Value;
use yurlungur_core::{
    bridge::python::{parse_output, render},
    HostBridge, HostKind, ModuleLoader, Request, Result, YurlungurError,
};

use crate::{App, AppConfig, Locator};

/// A [`HostBridge`] that evaluates every request in a fresh run of the host's
/// headless interpreter.
#[derive(Debug)]
pub struct ScriptBridge {
    app: App,
}

impl ScriptBridge {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }
}

impl HostBridge for ScriptBridge {
    fn eval(&self, request: &Request) -> Result<Value> {
        let program = render(request);
        let shell = self.app.shell_output(&program)?;
        // A script that raised leaves no result; its traceback is on stderr
        let output = parse_output(&shell.stdout).map_err(|err| match err {
            YurlungurError::Bridge(msg) if !shell.stderr.trim().is_empty() => {
                YurlungurError::Bridge(format!("{msg}: {}", shell.stderr.trim_end()))
            }
            other => other,
        })?;
        for line in &output.log {
            tracing::debug!("[{}] {}", self.app.kind(), line);
        }
        Ok(output.result)
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.app.shell(source)
    }
}

/// Resolves hosts to [`ScriptBridge`]s. A host is importable when its
/// interpreter can be located and run scripts.
#[derive(Debug, Clone)]
pub struct AppLoader {
    locator: Locator,
    config: AppConfig,
}

impl AppLoader {
    pub fn new(config: AppConfig) -> Self {
        Self::with_locator(config, Locator::from_env())
    }

    pub fn with_locator(config: AppConfig, locator: Locator) -> Self {
        Self { locator, config }
    }
}

impl ModuleLoader for AppLoader {
    fn import(&self, kind: HostKind) -> Option<Arc<dyn HostBridge>> {
        match App::with_locator(kind, &self.config, self.locator.clone()) {
            Ok(app) if app.has_shell() => Some(Arc::new(ScriptBridge::new(app))),
            Ok(_) => {
                tracing::debug!("{} has no scriptable interpreter", kind);
                None
            }
            Err(err) => {
                tracing::debug!("Cannot import {}: {}", kind, err);
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;
    use yurlungur_core::{detect, use_host, HostLogLayer, NativeCall, ProcessEnv};

    use super::*;
    use crate::{testing::fake_executable, Platform};

    const FAKE_BLENDER: &str = r#"echo "Blender 4.1.0"
echo '@@yurlungur@@["Cube", "Camera"]'
echo "Blender quit""#;

    fn blender_locator(dir: &tempfile::TempDir) -> Locator {
        Locator::empty(Platform::Linux).with_search_path([dir.path().to_owned()])
    }

    #[test_log::test]
    fn test_eval_parses_result() {
        let dir = tempdir().unwrap();
        fake_executable(&dir, "blender", FAKE_BLENDER);
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));
        let bridge = loader.import(HostKind::Blender).unwrap();

        let value = bridge
            .eval(&NativeCall::new("bpy", "list").into())
            .unwrap();
        assert_eq!(value, json!(["Cube", "Camera"]));
    }

    #[test_log::test]
    fn test_detect_blender_through_loader() {
        let dir = tempdir().unwrap();
        fake_executable(&dir, "blender", FAKE_BLENDER);
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));

        let env = ProcessEnv::new("/Applications/Blender.app/Contents/MacOS/Blender");
        let session = detect(&env, &loader);
        assert_eq!(session.kind(), HostKind::Blender);
        let names: Vec<String> = session
            .cmd()
            .ls(None)
            .unwrap()
            .iter()
            .map(|node| node.path().to_owned())
            .collect();
        assert_eq!(names, vec!["Cube", "Camera"]);
    }

    #[test_log::test]
    fn test_missing_result_is_a_bridge_error() {
        let dir = tempdir().unwrap();
        fake_executable(&dir, "blender", "echo nothing to see");
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));
        let session = use_host("bpy", &loader).unwrap();
        assert!(matches!(
            session.cmd().ls(None),
            Err(YurlungurError::Bridge(_))
        ));
    }

    #[test_log::test]
    fn test_shell_returns_stdout() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.hosts.insert(
            HostKind::Blender,
            crate::HostConfig {
                executable: Some("/bin/sh".into()),
                gui: None,
                shell: Some(vec!["-c".to_owned(), "{script}".to_owned()]),
            },
        );
        let loader = AppLoader::with_locator(config, blender_locator(&dir));
        let session = use_host("blender", &loader).unwrap();
        assert_eq!(session.shell("echo 2").unwrap(), "2");
    }

    #[test]
    fn test_unlocatable_host_is_not_importable() {
        let dir = tempdir().unwrap();
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));
        assert!(loader.import(HostKind::Maya).is_none());
        assert!(matches!(
            use_host("maya", &loader),
            Err(YurlungurError::ModuleNotFound(_))
        ));
    }

    #[test_log::test]
    fn test_traceback_is_kept_when_script_raises() {
        let dir = tempdir().unwrap();
        fake_executable(
            &dir,
            "blender",
            r#"echo "Blender 4.1.0 (hash abc)"
echo "Traceback (most recent call last):" >&2
echo "NameError: name 'bpyy' is not defined" >&2
echo "Blender quit"
exit 0"#,
        );
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));
        let session = use_host("blender", &loader).unwrap();
        match session.cmd().ls(None) {
            Err(YurlungurError::Bridge(msg)) => {
                assert!(msg.contains("without reporting a result"));
                assert!(msg.contains("NameError: name 'bpyy' is not defined"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test_log::test]
    fn test_script_sessions_do_not_mirror_logs() {
        let dir = tempdir().unwrap();
        fake_executable(&dir, "blender", FAKE_BLENDER);
        let loader = AppLoader::with_locator(AppConfig::default(), blender_locator(&dir));
        let session = use_host("blender", &loader).unwrap();
        assert!(!session.is_in_process());
        assert!(HostLogLayer::for_session(&session).is_none());
    }
}
