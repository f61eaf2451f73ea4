use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{kwargs_tail, lit, path_str};
use crate::{
    bridge::python::RESULT_VAR, HostAdapter, HostBridge, HostKind, NativeCall, Options, Result,
    Script, Severity,
};

/// Rumba does not expose its node type registry, so the built-in types are
/// listed here.
const NODE_TYPES: [&str; 19] = [
    "SceneGraphNode",
    "AnimLayer",
    "AnimLayerBlend",
    "ConstraintLayer",
    "EvalSurface",
    "GetArray",
    "GetDict",
    "IsoCurve",
    "Lerp",
    "MakeArray",
    "MakeDict",
    "MakeSparseBuffer",
    "Reference",
    "RemoveAttribute",
    "SelectionSet",
    "SetAttribute",
    "ShapeAttribute",
    "SurfaceInfo",
    "TransformGeometry",
];

pub struct Rumba {
    bridge: Arc<dyn HostBridge>,
}

impl Rumba {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Exports report progress through a `rumbapy.Progress` context.
    fn with_progress(&self, module: &str, export: String, path: &Path) -> Result<Value> {
        let script = Script::new([module, "rumbapy"])
            .line("with rumbapy.Progress('Exporting animation...') as _progress:")
            .line(format!("    {export}"))
            .line(format!("{RESULT_VAR} = {}", lit(path_str(path))));
        self.bridge.eval(&script.into())
    }
}

impl HostAdapter for Rumba {
    fn kind(&self) -> HostKind {
        HostKind::Rumba
    }

    fn node_types(&self) -> Result<Vec<String>> {
        Ok(NODE_TYPES.iter().map(|t| t.to_string()).collect())
    }

    fn export_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        let export = format!(
            "rumba_alembic.export_nodes({}, progress=_progress.update{})",
            lit(path_str(path)),
            kwargs_tail(options)
        );
        self.with_progress("rumba_alembic", export, path)
    }

    /// Binary FBX of every asset and frame, with asset names prefixed by their
    /// root node like Maya does.
    fn export_fbx(&self, path: &Path, _options: &Options) -> Result<Value> {
        let export = format!(
            "fbx.export_nodes({}, [], [], False, True, _progress.update)",
            lit(path_str(path))
        );
        self.with_progress("fbx", export, path)
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "rumba.error",
            Severity::Warning => "rumba.warn",
            Severity::Info => "rumba.info",
        };
        self.bridge
            .eval(&NativeCall::new("rumba", function).arg(msg).into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::hosts::testing::RecordingBridge;

    #[test]
    fn test_node_types_do_not_touch_host() {
        let bridge = RecordingBridge::new();
        let rumba = Rumba::new(bridge.clone());
        let types = rumba.node_types().unwrap();
        assert_eq!(types.len(), 19);
        assert!(types.contains(&"Lerp".to_owned()));
        assert!(bridge.requests().is_empty());
    }

    #[test]
    fn test_abc_export_reports_progress() {
        let bridge = RecordingBridge::new().respond(json!("/out/anim.abc"));
        let rumba = Rumba::new(bridge.clone());
        rumba
            .export_alembic(Path::new("/out/anim.abc"), &Vec::new())
            .unwrap();
        let expected = indoc! {r#"
            import json
            import rumba_alembic
            import rumbapy
            with rumbapy.Progress('Exporting animation...') as _progress:
                rumba_alembic.export_nodes("/out/anim.abc", progress=_progress.update)
            _yr_result = "/out/anim.abc"
            print("@@yurlungur@@" + json.dumps(_yr_result, default=str))
        "#};
        assert_eq!(bridge.last_program(), expected);
    }
}
