use std::sync::Arc;

use crate::{HostAdapter, HostBridge, HostKind, NativeCall, Result, Severity};

pub struct Nuke {
    bridge: Arc<dyn HostBridge>,
}

impl Nuke {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for Nuke {
    fn kind(&self) -> HostKind {
        HostKind::Nuke
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "nuke.error",
            Severity::Warning => "nuke.warning",
            Severity::Info => "nuke.debug",
        };
        self.bridge
            .eval(&NativeCall::new("nuke", function).arg(msg).into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
