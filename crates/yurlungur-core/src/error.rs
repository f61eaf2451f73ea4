use std::process::ExitStatus;

use thiserror::Error;

use crate::{HostKind, Verb};

pub type Result<T, E = YurlungurError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum YurlungurError {
    #[error("Unknown host application: {0}")]
    UnknownHost(String),
    #[error("Module {0} could not be imported")]
    ModuleNotFound(String),
    /// No adapter branch matches the host/verb combination. Raised before any
    /// call reaches the host.
    #[error("No adapter available for {verb} on {host}")]
    CapabilityUnavailable { host: HostKind, verb: Verb },
    #[error("{host} rejected {verb} of {target}")]
    HostRejected {
        host: HostKind,
        verb: Verb,
        target: String,
    },
    #[error("Bridge error: {0}")]
    Bridge(String),
    #[error("No executable found for {host} (looked for {candidates:?})")]
    ExecutableNotFound {
        host: HostKind,
        candidates: Vec<String>,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ExternalProcess {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize host value: {0}")]
    Json(#[from] serde_json::Error),
}

impl YurlungurError {
    pub fn unavailable(host: HostKind, verb: Verb) -> Self {
        YurlungurError::CapabilityUnavailable { host, verb }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, YurlungurError::CapabilityUnavailable { .. })
    }
}
