use std::{fmt, path::Path};

use serde_json::Value;

use crate::{HostKind, Result, YurlungurError};

/// Every operation an adapter can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Ls,
    Glob,
    Select,
    Remove,
    NodeTypes,
    CreateNode,
    GetAttr,
    SetAttr,
    ImportAlembic,
    ExportAlembic,
    ImportFbx,
    ExportFbx,
    ImportUsd,
    ExportUsd,
    NewDocument,
    Log(Severity),
    Shell,
    InstallPackage,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Ls => f.write_str("ls"),
            Verb::Glob => f.write_str("glob"),
            Verb::Select => f.write_str("select"),
            Verb::Remove => f.write_str("rm"),
            Verb::NodeTypes => f.write_str("node types"),
            Verb::CreateNode => f.write_str("create node"),
            Verb::GetAttr => f.write_str("get attribute"),
            Verb::SetAttr => f.write_str("set attribute"),
            Verb::ImportAlembic => f.write_str("alembic import"),
            Verb::ExportAlembic => f.write_str("alembic export"),
            Verb::ImportFbx => f.write_str("fbx import"),
            Verb::ExportFbx => f.write_str("fbx export"),
            Verb::ImportUsd => f.write_str("usd import"),
            Verb::ExportUsd => f.write_str("usd export"),
            Verb::NewDocument => f.write_str("new document"),
            Verb::Log(severity) => write!(f, "log {severity}"),
            Verb::Shell => f.write_str("shell"),
            Verb::InstallPackage => f.write_str("package install"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Errors map to [`Severity::Error`], warnings to [`Severity::Warning`] and
    /// everything below to [`Severity::Info`].
    pub fn from_level(level: &tracing::Level) -> Severity {
        if *level == tracing::Level::ERROR {
            Severity::Error
        } else if *level == tracing::Level::WARN {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Extra importer/exporter settings, forwarded to the host as keyword
/// arguments or editor properties.
pub type Options = Vec<(String, Value)>;

/// The capability interface each host implements.
///
/// Every method defaults to [`YurlungurError::CapabilityUnavailable`] without
/// contacting the host, so an adapter only overrides what its host can do.
pub trait HostAdapter: Send + Sync {
    fn kind(&self) -> HostKind;

    fn unavailable(&self, verb: Verb) -> YurlungurError {
        YurlungurError::unavailable(self.kind(), verb)
    }

    /// List scene objects, optionally filtered by a host-side pattern.
    fn ls(&self, _filter: Option<&str>) -> Result<Vec<String>> {
        Err(self.unavailable(Verb::Ls))
    }

    fn glob(&self, _pattern: &str) -> Result<Vec<String>> {
        Err(self.unavailable(Verb::Glob))
    }

    /// Replace the host's selection with `paths`. An empty list clears it.
    fn select(&self, _paths: &[String]) -> Result<()> {
        Err(self.unavailable(Verb::Select))
    }

    /// Delete `paths`. An empty list does nothing.
    fn remove(&self, _paths: &[String]) -> Result<()> {
        Err(self.unavailable(Verb::Remove))
    }

    /// All node type names known to the host. Filtering happens on our side.
    fn node_types(&self) -> Result<Vec<String>> {
        Err(self.unavailable(Verb::NodeTypes))
    }

    fn create_node(&self, _parent: &str, _node_type: &str) -> Result<String> {
        Err(self.unavailable(Verb::CreateNode))
    }

    fn get_attr(&self, _path: &str, _attr: &str) -> Result<Value> {
        Err(self.unavailable(Verb::GetAttr))
    }

    fn set_attr(&self, _path: &str, _attr: &str, _value: &Value) -> Result<()> {
        Err(self.unavailable(Verb::SetAttr))
    }

    fn import_alembic(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ImportAlembic))
    }

    fn export_alembic(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ExportAlembic))
    }

    fn import_fbx(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ImportFbx))
    }

    fn export_fbx(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ExportFbx))
    }

    fn import_usd(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ImportUsd))
    }

    fn export_usd(&self, _path: &Path, _options: &Options) -> Result<Value> {
        Err(self.unavailable(Verb::ExportUsd))
    }

    fn new_document(&self) -> Result<()> {
        Err(self.unavailable(Verb::NewDocument))
    }

    /// Send one message to the host's native log at exactly the given severity.
    fn log(&self, severity: Severity, _msg: &str) -> Result<()> {
        Err(self.unavailable(Verb::Log(severity)))
    }

    fn shell(&self, _source: &str) -> Result<String> {
        Err(self.unavailable(Verb::Shell))
    }
}
