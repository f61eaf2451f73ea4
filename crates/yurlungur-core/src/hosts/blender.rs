use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{ensure_accepted, kwargs_tail, lit, path_str, strings};
use crate::{
    bridge::python::RESULT_VAR, HostAdapter, HostBridge, HostKind, Options, Result, Script, Verb,
};

pub struct Blender {
    bridge: Arc<dyn HostBridge>,
}

impl Blender {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    fn script(&self) -> Script {
        Script::new(["bpy"])
    }

    fn objects(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let script = match pattern {
            Some(pattern) => Script::new(["bpy", "fnmatch"]).line(format!(
                "{RESULT_VAR} = [o.name for o in bpy.data.objects if fnmatch.fnmatchcase(o.name, {})]",
                lit(pattern)
            )),
            None => self
                .script()
                .line(format!("{RESULT_VAR} = [o.name for o in bpy.data.objects]")),
        };
        strings(self.bridge.eval(&script.into())?)
    }

    /// Run an operator and check it reported `FINISHED`.
    fn operator(&self, verb: Verb, op: &str, path: &Path, options: &Options) -> Result<Value> {
        let script = self.script().line(format!(
            "{RESULT_VAR} = sorted(bpy.ops.{op}(filepath={}{}))",
            lit(path_str(path)),
            kwargs_tail(options)
        ));
        let status = strings(self.bridge.eval(&script.into())?)?;
        ensure_accepted(
            HostKind::Blender,
            verb,
            path,
            status.iter().any(|s| s == "FINISHED"),
        )?;
        Ok(Value::String(path_str(path)))
    }

    fn remove_objects(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let script = self
            .script()
            .line(format!("for _name in {}:", lit(paths.to_vec())))
            .line("    bpy.data.objects.remove(bpy.data.objects[_name], do_unlink=True)")
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }
}

impl HostAdapter for Blender {
    fn kind(&self) -> HostKind {
        HostKind::Blender
    }

    fn ls(&self, filter: Option<&str>) -> Result<Vec<String>> {
        self.objects(filter)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.objects(Some(pattern))
    }

    fn select(&self, paths: &[String]) -> Result<()> {
        let script = self
            .script()
            .line("for _object in bpy.context.view_layer.objects:")
            .line("    _object.select_set(False)")
            .line(format!("for _name in {}:", lit(paths.to_vec())))
            .line("    bpy.data.objects[_name].select_set(True)")
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }

    fn remove(&self, paths: &[String]) -> Result<()> {
        self.remove_objects(paths)
    }

    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ImportAlembic, "wm.alembic_import", path, options)
    }

    fn export_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ExportAlembic, "wm.alembic_export", path, options)
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ImportFbx, "import_scene.fbx", path, options)
    }

    fn export_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ExportFbx, "export_scene.fbx", path, options)
    }

    fn import_usd(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ImportUsd, "wm.usd_import", path, options)
    }

    fn export_usd(&self, path: &Path, options: &Options) -> Result<Value> {
        self.operator(Verb::ExportUsd, "wm.usd_export", path, options)
    }

    fn new_document(&self) -> Result<()> {
        let script = self.script().line(format!(
            "{RESULT_VAR} = sorted(bpy.ops.wm.read_homefile(use_empty=True))"
        ));
        self.bridge.eval(&script.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
