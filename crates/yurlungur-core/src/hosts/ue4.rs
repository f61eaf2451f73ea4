use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{lit, path_str};
use crate::{
    bridge::python::{to_literal, RESULT_VAR},
    HostAdapter, HostBridge, HostKind, NativeCall, Options, Result, Script, Severity,
};

pub struct Ue4 {
    bridge: Arc<dyn HostBridge>,
}

impl Ue4 {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Import through `AutomatedAssetImportData`. Options become editor
    /// properties of the import data, e.g. `destination_path`.
    fn automated_import(
        &self,
        path: &Path,
        options: &Options,
        factory: Option<&str>,
    ) -> Result<Value> {
        let mut script = Script::new(["unreal"])
            .line("_data = unreal.AutomatedAssetImportData()")
            .line(format!(
                "_data.set_editor_property('filenames', [{}])",
                lit(path_str(path))
            ));
        if let Some(factory) = factory {
            script = script.line(format!(
                "_data.set_editor_property('factory', unreal.{factory}())"
            ));
        }
        for (key, value) in options {
            script = script.line(format!(
                "_data.set_editor_property({}, {})",
                lit(key.as_str()),
                to_literal(value)
            ));
        }
        let script = script
            .line("_tools = unreal.AssetToolsHelpers.get_asset_tools()")
            .line(format!(
                "{RESULT_VAR} = [a.get_path_name() for a in _tools.import_assets_automated(_data)]"
            ));
        self.bridge.eval(&script.into())
    }
}

impl HostAdapter for Ue4 {
    fn kind(&self) -> HostKind {
        HostKind::Ue4
    }

    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.automated_import(path, options, None)
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.automated_import(path, options, Some("FbxSceneImportFactory"))
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "unreal.log_error",
            Severity::Warning => "unreal.log_warning",
            Severity::Info => "unreal.log",
        };
        let call = NativeCall::new("unreal", function).arg(msg);
        self.bridge.eval(&call.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::hosts::testing::RecordingBridge;

    #[test]
    fn test_fbx_import_uses_scene_factory() {
        let bridge = RecordingBridge::new().respond(json!(["/Game/char.char"]));
        let ue4 = Ue4::new(bridge.clone());
        let options = vec![("destination_path".to_owned(), json!("/Game/Characters"))];
        let assets = ue4
            .import_fbx(Path::new("C:/assets/char.fbx"), &options)
            .unwrap();
        assert_eq!(assets, json!(["/Game/char.char"]));
        let program = bridge.last_program();
        assert!(
            program.contains("_data.set_editor_property('filenames', [\"C:/assets/char.fbx\"])")
        );
        assert!(program.contains("unreal.FbxSceneImportFactory()"));
        assert!(program
            .contains(r#"_data.set_editor_property("destination_path", "/Game/Characters")"#));
        assert!(program.contains("import_assets_automated(_data)"));
    }

    #[test]
    fn test_abc_import_has_no_factory() {
        let bridge = RecordingBridge::new();
        let ue4 = Ue4::new(bridge.clone());
        ue4.import_alembic(Path::new("C:/a.abc"), &Vec::new()).unwrap();
        assert!(!bridge.last_program().contains("factory"));
    }

    #[test]
    fn test_export_unavailable() {
        let bridge = RecordingBridge::new();
        let ue4 = Ue4::new(bridge.clone());
        assert!(ue4
            .export_alembic(Path::new("C:/a.abc"), &Vec::new())
            .unwrap_err()
            .is_unavailable());
    }
}
