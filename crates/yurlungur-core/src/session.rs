use std::{fmt, sync::Arc};

use crate::{
    hosts::Standalone,
    proxy::{Command, File, Logger, Node},
    HostAdapter, HostBridge, HostKind, Result,
};

/// The resolved host for this process.
///
/// A session is created once by [`crate::detect`] or [`crate::use_host`] and
/// passed to whatever needs to talk to the host. Switching hosts means creating
/// a new session; nodes and file targets from the old one are plain values and
/// stay valid as data, but verbs always run against the session they are given.
#[derive(Clone)]
pub struct HostSession {
    adapter: Arc<dyn HostAdapter>,
    in_process: bool,
}

impl HostSession {
    pub fn new(kind: HostKind, bridge: Arc<dyn HostBridge>) -> Self {
        let in_process = bridge.in_process();
        Self {
            adapter: Arc::from(kind.adapter(bridge)),
            in_process,
        }
    }

    /// A session over a custom adapter. Its requests are treated as running
    /// out of process.
    pub fn from_adapter(adapter: Arc<dyn HostAdapter>) -> Self {
        Self {
            adapter,
            in_process: false,
        }
    }

    pub fn standalone() -> Self {
        Self::from_adapter(Arc::new(Standalone))
    }

    pub fn kind(&self) -> HostKind {
        self.adapter.kind()
    }

    pub fn is_standalone(&self) -> bool {
        self.kind() == HostKind::Standalone
    }

    /// Whether the host runtime lives in this process.
    pub fn is_in_process(&self) -> bool {
        self.in_process
    }

    pub fn adapter(&self) -> &dyn HostAdapter {
        self.adapter.as_ref()
    }

    /// Scene-level verbs: `ls`, `glob`, `select`, `rm`.
    pub fn cmd(&self) -> Command<'_> {
        Command::new(self)
    }

    /// Import/export verbs.
    pub fn file(&self) -> File<'_> {
        File::new(self)
    }

    pub fn logger(&self) -> Logger<'_> {
        Logger::new(self)
    }

    pub fn node(&self, path: impl Into<String>) -> Node {
        Node::new(path)
    }

    /// Run raw source in the host's interpreter and return what it printed.
    pub fn shell(&self, source: &str) -> Result<String> {
        self.adapter.shell(source)
    }
}

impl fmt::Debug for HostSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSession")
            .field("kind", &self.kind())
            .field("in_process", &self.in_process)
            .finish()
    }
}

impl Default for HostSession {
    fn default() -> Self {
        Self::standalone()
    }
}
