use std::sync::Arc;

use crate::{HostAdapter, HostBridge, HostKind, NativeCall, Result, Severity};

pub struct C4d {
    bridge: Arc<dyn HostBridge>,
}

impl C4d {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for C4d {
    fn kind(&self) -> HostKind {
        HostKind::C4d
    }

    /// Cinema 4D has a single console print, so the severity travels as a
    /// prefix.
    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let line = match severity {
            Severity::Error => format!("Error: {msg}"),
            Severity::Warning => format!("Warning: {msg}"),
            Severity::Info => msg.to_owned(),
        };
        self.bridge
            .eval(&NativeCall::new("c4d", "c4d.GePrint").arg(line).into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
