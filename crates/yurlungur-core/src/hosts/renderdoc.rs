use std::sync::Arc;

use crate::{Arg, HostAdapter, HostBridge, HostKind, NativeCall, Result, Severity};

pub struct RenderDoc {
    bridge: Arc<dyn HostBridge>,
}

impl RenderDoc {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }
}

impl HostAdapter for RenderDoc {
    fn kind(&self) -> HostKind {
        HostKind::RenderDoc
    }

    /// `LogMessage(type, project, file, line, text)`
    fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        let log_type = match severity {
            Severity::Error => "renderdoc.LogType.Error",
            Severity::Warning => "renderdoc.LogType.Warning",
            Severity::Info => "renderdoc.LogType.Debug",
        };
        let call = NativeCall::new("renderdoc", "renderdoc.LogMessage")
            .arg(Arg::expr(log_type))
            .arg("")
            .arg("yurlungur")
            .arg(0)
            .arg(msg);
        self.bridge.eval(&call.into())?;
        Ok(())
    }

    fn shell(&self, source: &str) -> Result<String> {
        self.bridge.shell(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::testing::RecordingBridge;

    #[test]
    fn test_info_logs_at_debug_type() {
        let bridge = RecordingBridge::new();
        let renderdoc = RenderDoc::new(bridge.clone());
        renderdoc.log(Severity::Info, "capture loaded").unwrap();
        assert!(bridge.last_program().contains(
            r#"renderdoc.LogMessage(renderdoc.LogType.Debug, "", "yurlungur", 0, "capture loaded")"#
        ));
    }
}
