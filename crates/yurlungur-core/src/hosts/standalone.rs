use crate::{HostAdapter, HostKind};

/// The fallback used outside any host. It has no native capabilities: every
/// verb fails with `CapabilityUnavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Standalone;

impl HostAdapter for Standalone {
    fn kind(&self) -> HostKind {
        HostKind::Standalone
    }
}
