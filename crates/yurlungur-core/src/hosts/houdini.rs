use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{lit, path_str, strings};
use crate::{
    bridge::python::{render_call, to_literal, RESULT_VAR},
    Arg, HostAdapter, HostBridge, HostKind, NativeCall, Options, Result, Script, Severity, Verb,
    YurlungurError,
};

pub struct Houdini {
    bridge: Arc<dyn HostBridge>,
}

impl Houdini {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    fn script(&self) -> Script {
        Script::new(["hou"])
    }

    fn destroy_nodes(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let script = self
            .script()
            .line(format!("for _path in {}:", lit(paths.to_vec())))
            .line("    hou.node(_path).destroy()")
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }
}

impl HostAdapter for Houdini {
    fn kind(&self) -> HostKind {
        HostKind::Houdini
    }

    fn ls(&self, filter: Option<&str>) -> Result<Vec<String>> {
        if let Some(filter) = filter {
            return self.glob(filter);
        }
        let script = self
            .script()
            .line(format!("{RESULT_VAR} = [n.path() for n in hou.pwd().allItems()]"));
        strings(self.bridge.eval(&script.into())?)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let script = self.script().line(format!(
            "{RESULT_VAR} = [n.path() for n in hou.pwd().glob({})]",
            lit(pattern)
        ));
        strings(self.bridge.eval(&script.into())?)
    }

    fn select(&self, paths: &[String]) -> Result<()> {
        let script = self
            .script()
            .line("hou.clearAllSelected()")
            .line(format!("for _path in {}:", lit(paths.to_vec())))
            .line("    hou.node(_path).setSelected(True)")
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }

    fn remove(&self, paths: &[String]) -> Result<()> {
        self.destroy_nodes(paths)
    }

    fn node_types(&self) -> Result<Vec<String>> {
        let script = self.script().line(format!(
            "{RESULT_VAR} = sorted(set(t for c in hou.nodeTypeCategories().values() for t in c.nodeTypes().keys()))"
        ));
        strings(self.bridge.eval(&script.into())?)
    }

    fn create_node(&self, parent: &str, node_type: &str) -> Result<String> {
        let parent = if parent.is_empty() { "/obj" } else { parent };
        let script = self.script().line(format!(
            "{RESULT_VAR} = hou.node({}).createNode({}).path()",
            lit(parent),
            lit(node_type)
        ));
        match self.bridge.eval(&script.into())? {
            Value::String(path) => Ok(path),
            other => Err(YurlungurError::Bridge(format!(
                "createNode {node_type} returned {other}"
            ))),
        }
    }

    fn get_attr(&self, path: &str, attr: &str) -> Result<Value> {
        let script = self.script().line(format!(
            "{RESULT_VAR} = hou.node({}).parm({}).eval()",
            lit(path),
            lit(attr)
        ));
        self.bridge.eval(&script.into())
    }

    fn set_attr(&self, path: &str, attr: &str, value: &Value) -> Result<()> {
        let script = self
            .script()
            .line(format!(
                "hou.node({}).parm({}).set({})",
                lit(path),
                lit(attr),
                to_literal(value)
            ))
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }

    /// Builds `/obj/geo*/alembic*` pointing at the file.
    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        let mut script = self
            .script()
            .line("_geo = hou.node('/obj').createNode('geo')")
            .line("_abc = _geo.createNode('alembic')")
            .line(format!("_abc.parm('fileName').set({})", lit(path_str(path))));
        for (key, value) in options {
            script = script.line(format!(
                "_abc.parm({}).set({})",
                lit(key.as_str()),
                to_literal(value)
            ));
        }
        let script = script.line(format!("{RESULT_VAR} = _abc.path()"));
        self.bridge.eval(&script.into())
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        let mut call = NativeCall::new("hou", "hou.hipFile.importFBX").arg(path_str(path));
        for (key, value) in options {
            call = call.kwarg(key.clone(), value.clone());
        }
        // importFBX returns (node, messages)
        let script = self
            .script()
            .line(format!(
                "_node, _messages = {}",
                render_call(&call)
            ))
            .line(format!("{RESULT_VAR} = _node.path() if _node else None"));
        match self.bridge.eval(&script.into())? {
            Value::Null => Err(YurlungurError::HostRejected {
                host: HostKind::Houdini,
                verb: Verb::ImportFbx,
                target: path.display().to_string(),
            }),
            node => Ok(node),
        }
    }

    fn new_document(&self) -> Result<()> {
        let call = NativeCall::new("hou", "hou.hipFile.clear").kwarg("suppress_save_prompt", true);
        self.bridge.eval(&call.into())?;
        Ok(())
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let token = match severity {
            Severity::Error => "hou.severityType.Error",
            Severity::Warning => "hou.severityType.Warning",
            Severity::Info => "hou.severityType.Message",
        };
        let call = NativeCall::new("hou", "hou.ui.setStatusMessage")
            .arg(msg)
            .kwarg("severity", Arg::expr(token));
        self.bridge.eval(&call.into())?;
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
    fn test_ls_walks_current_network() {
        let bridge = RecordingBridge::new().respond(json!(["/obj/geo1", "/obj/cam1"]));
        let houdini = Houdini::new(bridge.clone());
        assert_eq!(houdini.ls(None).unwrap(), vec!["/obj/geo1", "/obj/cam1"]);
        assert!(bridge.last_program().contains("hou.pwd().allItems()"));
    }

    #[test]
    fn test_ls_with_filter_globs() {
        let bridge = RecordingBridge::new();
        let houdini = Houdini::new(bridge.clone());
        houdini.ls(Some("geo*")).unwrap();
        assert!(bridge.last_program().contains(r#"hou.pwd().glob("geo*")"#));
    }

    #[test]
    fn test_abc_import_builds_sop() {
        let bridge = RecordingBridge::new().respond(json!("/obj/geo1/alembic1"));
        let houdini = Houdini::new(bridge.clone());
        let node = houdini
            .import_alembic(Path::new("/assets/shot.abc"), &Vec::new())
            .unwrap();
        assert_eq!(node, json!("/obj/geo1/alembic1"));
        let expected = indoc! {r#"
            import json
            import hou
            _geo = hou.node('/obj').createNode('geo')
            _abc = _geo.createNode('alembic')
            _abc.parm('fileName').set("/assets/shot.abc")
            _yr_result = _abc.path()
            print("@@yurlungur@@" + json.dumps(_yr_result, default=str))
        "#};
        assert_eq!(bridge.last_program(), expected);
    }

    #[test]
    fn test_fbx_import_without_node_is_rejected() {
        let bridge = RecordingBridge::new().respond(json!(null));
        let houdini = Houdini::new(bridge.clone());
        let err = houdini
            .import_fbx(Path::new("/assets/char.fbx"), &Vec::new())
            .unwrap_err();
        assert!(matches!(err, YurlungurError::HostRejected { .. }));
    }

    #[test]
    fn test_select_replaces_selection() {
        let bridge = RecordingBridge::new();
        let houdini = Houdini::new(bridge.clone());
        houdini
            .select(&["/obj/geo1".to_owned(), "/obj/cam1".to_owned()])
            .unwrap();
        let expected = indoc! {r#"
            import json
            import hou
            hou.clearAllSelected()
            for _path in ["/obj/geo1", "/obj/cam1"]:
                hou.node(_path).setSelected(True)
            _yr_result = None
            print("@@yurlungur@@" + json.dumps(_yr_result, default=str))
        "#};
        assert_eq!(bridge.last_program(), expected);

        houdini.select(&[]).unwrap();
        let program = bridge.last_program();
        assert!(program.contains("hou.clearAllSelected()"));
        assert!(program.contains("for _path in []:"));
    }

    #[test]
    fn test_remove_destroys_nodes() {
        let bridge = RecordingBridge::new();
        let houdini = Houdini::new(bridge.clone());
        houdini.remove(&[]).unwrap();
        assert!(bridge.requests().is_empty());

        houdini.remove(&["/obj/geo1".to_owned()]).unwrap();
        let program = bridge.last_program();
        assert!(program.contains(r#"for _path in ["/obj/geo1"]:"#));
        assert!(program.contains("    hou.node(_path).destroy()"));
    }

    #[test]
    fn test_node_types_span_all_categories() {
        let bridge = RecordingBridge::new().respond(json!(["alembic", "geo", "null"]));
        let houdini = Houdini::new(bridge.clone());
        assert_eq!(houdini.node_types().unwrap(), vec!["alembic", "geo", "null"]);
        let program = bridge.last_program();
        assert!(program.contains("hou.nodeTypeCategories().values()"));
        assert!(program.contains("c.nodeTypes().keys()"));
    }

    #[test]
    fn test_new_document_clears_without_prompt() {
        let bridge = RecordingBridge::new();
        let houdini = Houdini::new(bridge.clone());
        houdini.new_document().unwrap();
        assert!(bridge
            .last_program()
            .contains("_yr_result = hou.hipFile.clear(suppress_save_prompt=True)"));
    }

    #[test]
    fn test_log_uses_severity_tokens() {
        let bridge = RecordingBridge::new();
        let houdini = Houdini::new(bridge.clone());
        houdini.log(Severity::Info, "cooked").unwrap();
        assert!(bridge.last_program().contains(
            r#"hou.ui.setStatusMessage("cooked", severity=hou.severityType.Message)"#
        ));
    }
}
