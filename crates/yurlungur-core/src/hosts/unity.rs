use std::sync::Arc;

use crate::{HostAdapter, HostBridge, HostKind, NativeCall, Result, Severity};

pub struct Unity {
    bridge: Arc<dyn HostBridge>,
}

impl Unity {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for Unity {
    fn kind(&self) -> HostKind {
        HostKind::Unity
    }

    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let function = match severity {
            Severity::Error => "UnityEngine.Debug.LogError",
            Severity::Warning => "UnityEngine.Debug.LogWarning",
            Severity::Info => "UnityEngine.Debug.Log",
        };
        let call = NativeCall::new("UnityEngine", function).arg(msg);
        self.bridge.eval(&call.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}
