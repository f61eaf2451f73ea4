//! Substance Designer and Substance Painter.

use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{kwargs_tail, lit, path_str};
use crate::{
    bridge::python::RESULT_VAR, HostAdapter, HostBridge, HostKind, NativeCall, Options, Result,
    Script, Severity,
};

pub struct Designer {
    bridge: Arc<dyn HostBridge>,
}

impl Designer {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for Designer {
    fn kind(&self) -> HostKind {
        HostKind::SubstanceDesigner
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let level = match severity {
            Severity::Error => "sd.logger.LogLevel.Error",
            Severity::Warning => "sd.logger.LogLevel.Warning",
            Severity::Info => "sd.logger.LogLevel.Info",
        };
        let script = Script::new(["sd", "sd.logger"])
            .line(format!(
                "sd.getContext().getLogger().log({}, {level})",
                lit(msg)
            ))
            .line(format!("{RESULT_VAR} = None"));
        self.bridge.eval(&script.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}

pub struct Painter {
    bridge: Arc<dyn HostBridge>,
}

impl Painter {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// Painter imports meshes by creating a project around them. It accepts
    /// fbx, obj, dae, ply, gltf and abc.
    fn create_project(&self, path: &Path, options: &Options) -> Result<Value> {
        let script = Script::new(["substance_painter.project"])
            .line(format!(
                "substance_painter.project.create({}{})",
                lit(path_str(path)),
                kwargs_tail(options)
            ))
            .line(format!("{RESULT_VAR} = {}", lit(path_str(path))));
        self.bridge.eval(&script.into())
    }
}

impl HostAdapter for Painter {
    fn kind(&self) -> HostKind {
        HostKind::SubstancePainter
    }

    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.create_project(path, options)
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.create_project(path, options)
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "substance_painter.logging.error",
            Severity::Warning => "substance_painter.logging.warning",
            Severity::Info => "substance_painter.logging.info",
        };
        let call = NativeCall::new("substance_painter.logging", function).arg(msg);
        self.bridge.eval(&call.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
