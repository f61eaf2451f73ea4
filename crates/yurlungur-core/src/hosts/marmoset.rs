use std::sync::Arc;

use crate::{HostAdapter, HostBridge, HostKind, NativeCall, Result, Severity};

pub struct Marmoset {
    bridge: Arc<dyn HostBridge>,
}

impl Marmoset {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for Marmoset {
    fn kind(&self) -> HostKind {
        HostKind::Marmoset
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "mset.err",
            Severity::Warning => "mset.fail",
            Severity::Info => "mset.log",
        };
        self.bridge
            .eval(&NativeCall::new("mset", function).arg(msg).into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
