use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{kwargs_tail, lit, path_str, strings};
use crate::bridge::python::RESULT_VAR;
use crate::{
    Arg, HostAdapter, HostBridge, HostKind, NativeCall, Options, Request, Result, Script,
    Severity, YurlungurError,
};

const CMDS: &str = "maya.cmds";
const MEL: &str = "maya.mel";
const STANDALONE: &str = "maya.standalone";

/// Node type categories accepted by `listNodeTypes`.
const NODE_TYPE_CATEGORIES: [&str; 9] = [
    "geometry",
    "camera",
    "light",
    "utility",
    "color",
    "shader",
    "texture",
    "rendering",
    "postprocess",
];

pub struct Maya {
    bridge: Arc<dyn HostBridge>,
}

impl Maya {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Every request starts the standalone runtime first: a bare `mayapy` has
    /// no commands in `maya.cmds` until then. Inside an interactive session the
    /// call raises and is ignored.
    fn eval(&self, request: impl Into<Request>) -> Result<Value> {
        let request = request.into().into_script();
        let mut script = Script::new([STANDALONE])
            .line("try:")
            .line(format!("    {STANDALONE}.initialize()"))
            .line("except RuntimeError:")
            .line("    pass");
        script.imports.extend(request.imports);
        script.body.extend(request.body);
        self.bridge.eval(&script.into())
    }

    fn cmd(&self, name: &str) -> NativeCall {
        NativeCall::new(CMDS, format!("{CMDS}.{name}"))
    }

    fn mel(&self, command: String) -> Result<Value> {
        tracing::debug!("mel: {}", command);
        self.eval(NativeCall::new(MEL, "maya.mel.eval").arg(command))
    }
}

/// Quote a string for MEL.
fn mel_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "/").replace('"', "\\\""))
}

/// FBX plugin settings are MEL commands of the form `FBX<Setting> -v <value>;`.
fn fbx_settings(options: &Options) -> String {
    options
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => mel_string(s),
                other => other.to_string(),
            };
            format!("FBX{key} -v {value}; ")
        })
        .collect()
}

/// A value inside an AbcExport job string. Arrays become space separated
/// tokens (`frameRange: [1, 24]`), strings with whitespace are quoted.
fn job_token(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains(char::is_whitespace) => mel_string(s),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(job_token).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// AbcExport takes a single job string, e.g. `-frameRange 1 24 -file "a.abc"`.
fn abc_job(path: &Path, options: &Options) -> String {
    let mut job = String::new();
    for (key, value) in options {
        match value {
            Value::Bool(true) => job.push_str(&format!("-{key} ")),
            Value::Bool(false) => {}
            other => job.push_str(&format!("-{key} {} ", job_token(other))),
        }
    }
    job.push_str(&format!("-file {}", mel_string(&path_str(path))));
    job
}

impl HostAdapter for Maya {
    fn kind(&self) -> HostKind {
        HostKind::Maya
    }

    fn ls(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let call = match filter {
            Some(filter) => self.cmd("ls").arg(filter),
            None => self.cmd("ls"),
        };
        strings(self.eval(call)?)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        strings(self.eval(self.cmd("ls").arg(pattern))?)
    }

    fn select(&self, paths: &[String]) -> Result<()> {
        let call = if paths.is_empty() {
            self.cmd("select").kwarg("clear", true)
        } else {
            self.cmd("select").arg(paths.to_vec())
        };
        self.eval(call)?;
        Ok(())
    }

    fn remove(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        self.eval(self.cmd("delete").arg(paths.to_vec()))?;
        Ok(())
    }

    fn node_types(&self) -> Result<Vec<String>> {
        let script = Script::new([CMDS])
            .line(format!("_categories = {}", lit(NODE_TYPE_CATEGORIES.to_vec())))
            .line(format!(
                "{} = sorted(set(t for c in _categories for t in ({CMDS}.listNodeTypes(c) or [])))",
                RESULT_VAR
            ));
        strings(self.eval(script)?)
    }

    fn create_node(&self, parent: &str, node_type: &str) -> Result<String> {
        let mut call = self.cmd("createNode").arg(node_type);
        if !parent.is_empty() {
            call = call.kwarg("parent", parent);
        }
        let created = strings(self.eval(call)?)?;
        created.into_iter().next().ok_or_else(|| {
            YurlungurError::Bridge(format!("createNode {node_type} returned nothing"))
        })
    }

    fn get_attr(&self, path: &str, attr: &str) -> Result<Value> {
        self.eval(self.cmd("getAttr").arg(format!("{path}.{attr}")))
    }

    fn set_attr(&self, path: &str, attr: &str, value: &Value) -> Result<()> {
        let mut call = self
            .cmd("setAttr")
            .arg(format!("{path}.{attr}"))
            .arg(value.clone());
        if value.is_string() {
            call = call.kwarg("type", "string");
        }
        self.eval(call)?;
        Ok(())
    }

    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        let mut call = self.cmd("AbcImport").arg(path_str(path));
        for (key, value) in options {
            call = call.kwarg(key.clone(), value.clone());
        }
        self.eval(call)
    }

    fn export_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        let call = self.cmd("AbcExport").kwarg("j", abc_job(path, options));
        self.eval(call)?;
        Ok(Value::String(path_str(path)))
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.mel(format!(
            "{}FBXImport -file {};",
            fbx_settings(options),
            mel_string(&path_str(path))
        ))
    }

    fn export_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.mel(format!(
            "FBXExportInAscii -v true; {}FBXExport -f {} -s;",
            fbx_settings(options),
            mel_string(&path_str(path))
        ))?;
        Ok(Value::String(path_str(path)))
    }

    fn import_usd(&self, path: &Path, options: &Options) -> Result<Value> {
        let script = Script::new([CMDS]).line(format!(
            "{} = {CMDS}.mayaUSDImport(file={}{})",
            RESULT_VAR,
            lit(path_str(path)),
            kwargs_tail(options)
        ));
        self.eval(script)
    }

    fn export_usd(&self, path: &Path, options: &Options) -> Result<Value> {
        let script = Script::new([CMDS]).line(format!(
            "{} = {CMDS}.mayaUSDExport(file={}{})",
            RESULT_VAR,
            lit(path_str(path)),
            kwargs_tail(options)
        ));
        self.eval(script)?;
        Ok(Value::String(path_str(path)))
    }

    fn new_document(&self) -> Result<()> {
        let call = self.cmd("file").kwarg("new", true).kwarg("force", true);
        self.eval(call)?;
        Ok(())
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let method = match severity {
            Severity::Error => "displayError",
            Severity::Warning => "displayWarning",
            Severity::Info => "displayInfo",
        };
        let call = NativeCall::new("maya.OpenMaya", format!("maya.OpenMaya.MGlobal.{method}"))
            .arg(Arg::from(msg));
        self.eval(call)?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
