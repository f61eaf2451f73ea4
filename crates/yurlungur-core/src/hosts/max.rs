use std::{path::Path, sync::Arc};

use serde_json::Value;

use super::{ensure_accepted, path_str};
use crate::{Arg, HostAdapter, HostBridge, HostKind, NativeCall, Options, Result, Severity, Verb};

pub struct Max {
    bridge: Arc<dyn HostBridge>,
}

impl Max {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    /// `importFile`/`exportFile` with `#noPrompt` and a named plugin. Both
    /// report success as a boolean.
    fn transfer(
        &self,
        verb: Verb,
        function: &str,
        plugin: &str,
        path: &Path,
        options: &Options,
    ) -> Result<Value> {
        let mut call = NativeCall::new("pymxs", format!("pymxs.runtime.{function}"))
            .arg(path_str(path))
            .arg(Arg::expr("pymxs.runtime.Name('noPrompt')"))
            .kwarg("using", plugin);
        for (key, value) in options {
            call = call.kwarg(key.clone(), value.clone());
        }
        let accepted = self.bridge.eval(&call.into())?;
        ensure_accepted(HostKind::Max, verb, path, accepted == Value::Bool(true))?;
        Ok(Value::String(path_str(path)))
    }
}

impl HostAdapter for Max {
    fn kind(&self) -> HostKind {
        HostKind::Max
    }

    fn import_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.transfer(Verb::ImportAlembic, "importFile", "AlembicImport", path, options)
    }

    fn export_alembic(&self, path: &Path, options: &Options) -> Result<Value> {
        self.transfer(Verb::ExportAlembic, "exportFile", "AlembicExport", path, options)
    }

    fn import_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.transfer(Verb::ImportFbx, "importFile", "FBXIMPORTER", path, options)
    }

    fn export_fbx(&self, path: &Path, options: &Options) -> Result<Value> {
        self.transfer(Verb::ExportFbx, "exportFile", "FBXEXPORTER", path, options)
    }

    /// `print_(msg, isErr, forceFlush)`: warnings and errors both go to the
    /// error stream.
    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let (is_err, flush) = match severity {
            Severity::Error | Severity::Warning => (true, false),
            Severity::Info => (false, true),
        };
        let call = NativeCall::new("pymxs", "pymxs.print_")
            .arg(msg)
            .arg(is_err)
            .arg(flush);
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
    use crate::{hosts::testing::RecordingBridge, YurlungurError};

    #[test]
    fn test_abc_import_uses_no_prompt() {
        let bridge = RecordingBridge::new().respond(json!(true));
        let max = Max::new(bridge.clone());
        let out = max
            .import_alembic(Path::new("D:/shots/a.abc"), &Vec::new())
            .unwrap();
        assert_eq!(out, json!("D:/shots/a.abc"));
        assert!(bridge.last_program().contains(
            r#"pymxs.runtime.importFile("D:/shots/a.abc", pymxs.runtime.Name('noPrompt'), using="AlembicImport")"#
        ));
    }

    #[test]
    fn test_failed_export_is_rejected() {
        let bridge = RecordingBridge::new().respond(json!(false));
        let max = Max::new(bridge.clone());
        let err = max
            .export_fbx(Path::new("D:/out/a.fbx"), &Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            YurlungurError::HostRejected {
                host: HostKind::Max,
                verb: Verb::ExportFbx,
                ..
            }
        ));
    }

    #[test]
    fn test_no_usd() {
        let bridge = RecordingBridge::new();
        let max = Max::new(bridge.clone());
        let err = max
            .import_usd(Path::new("D:/a.usd"), &Vec::new())
            .unwrap_err();
        assert!(err.is_unavailable());
        assert!(bridge.requests().is_empty());
    }
}
