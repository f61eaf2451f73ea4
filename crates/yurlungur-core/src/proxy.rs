//! Host-agnostic handles for scene objects and import/export targets.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HostSession, Options, Result, Severity};

/// A host-native scene object, identified by its path in the host (a DAG path
/// in Maya, a node path in Houdini, an object name in Blender).
///
/// Two nodes are equal when they name the same host object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    path: String,
}

impl Node {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last component of the path.
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['/', '|'])
            .next()
            .unwrap_or(&self.path)
    }

    /// Look up an attribute on the host object.
    pub fn attr(&self, session: &HostSession, name: &str) -> Result<Value> {
        session.adapter().get_attr(&self.path, name)
    }

    pub fn set_attr(
        &self,
        session: &HostSession,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        session.adapter().set_attr(&self.path, name, &value.into())
    }

    /// Create a child node of the given type.
    pub fn create(&self, session: &HostSession, node_type: &str) -> Result<Node> {
        session
            .adapter()
            .create_node(&self.path, node_type)
            .map(Node::new)
    }

    pub fn delete(&self, session: &HostSession) -> Result<()> {
        session.adapter().remove(std::slice::from_ref(&self.path))
    }

    pub fn select(&self, session: &HostSession) -> Result<()> {
        session.adapter().select(std::slice::from_ref(&self.path))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for Node {
    fn from(path: &str) -> Self {
        Node::new(path)
    }
}

impl From<String> for Node {
    fn from(path: String) -> Self {
        Node::new(path)
    }
}

fn paths(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(|n| n.path.clone()).collect()
}

fn nodes(paths: Vec<String>) -> Vec<Node> {
    paths.into_iter().map(Node::new).collect()
}

/// Scene-level verbs of a session.
pub struct Command<'s> {
    session: &'s HostSession,
}

impl<'s> Command<'s> {
    pub(crate) fn new(session: &'s HostSession) -> Self {
        Self { session }
    }

    pub fn ls(&self, filter: Option<&str>) -> Result<Vec<Node>> {
        self.session.adapter().ls(filter).map(nodes)
    }

    pub fn glob(&self, pattern: &str) -> Result<Vec<Node>> {
        self.session.adapter().glob(pattern).map(nodes)
    }

    pub fn select(&self, nodes: &[Node]) -> Result<()> {
        self.session.adapter().select(&paths(nodes))
    }

    pub fn rm(&self, nodes: &[Node]) -> Result<()> {
        self.session.adapter().remove(&paths(nodes))
    }

    /// Node type names matching a glob pattern, e.g. `poly*`.
    pub fn node_types(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = Pattern::new(pattern)?;
        let mut types = self.session.adapter().node_types()?;
        types.retain(|t| pattern.matches(t));
        Ok(types)
    }

    pub fn node_type(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .session
            .adapter()
            .node_types()?
            .into_iter()
            .find(|t| t == name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Alembic,
    Fbx,
    Usd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Import,
    Export,
}

/// The outcome of an import or export: what was asked for, and what the host
/// returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTarget {
    pub path: PathBuf,
    pub format: Format,
    pub direction: Direction,
    pub options: Options,
    pub result: Value,
}

/// Import/export verbs of a session.
pub struct File<'s> {
    session: &'s HostSession,
}

impl<'s> File<'s> {
    pub(crate) fn new(session: &'s HostSession) -> Self {
        Self { session }
    }

    fn run(
        &self,
        path: &Path,
        format: Format,
        direction: Direction,
        options: Options,
    ) -> Result<FileTarget> {
        let adapter = self.session.adapter();
        let result = match (format, direction) {
            (Format::Alembic, Direction::Import) => adapter.import_alembic(path, &options),
            (Format::Alembic, Direction::Export) => adapter.export_alembic(path, &options),
            (Format::Fbx, Direction::Import) => adapter.import_fbx(path, &options),
            (Format::Fbx, Direction::Export) => adapter.export_fbx(path, &options),
            (Format::Usd, Direction::Import) => adapter.import_usd(path, &options),
            (Format::Usd, Direction::Export) => adapter.export_usd(path, &options),
        }?;
        tracing::debug!(
            "{:?} {:?} {} on {}",
            direction,
            format,
            path.display(),
            self.session.kind()
        );
        Ok(FileTarget {
            path: path.to_owned(),
            format,
            direction,
            options,
            result,
        })
    }

    pub fn abc_importer(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Alembic, Direction::Import, options)
    }

    pub fn abc_exporter(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Alembic, Direction::Export, options)
    }

    pub fn fbx_importer(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Fbx, Direction::Import, options)
    }

    pub fn fbx_exporter(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Fbx, Direction::Export, options)
    }

    pub fn usd_importer(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Usd, Direction::Import, options)
    }

    pub fn usd_exporter(&self, path: impl AsRef<Path>, options: Options) -> Result<FileTarget> {
        self.run(path.as_ref(), Format::Usd, Direction::Export, options)
    }

    pub fn new_document(&self) -> Result<()> {
        self.session.adapter().new_document()
    }
}

/// Sends messages to the host's native log.
///
/// There is no fallback: a severity the host has no call for fails with
/// `CapabilityUnavailable` rather than being logged at another level.
pub struct Logger<'s> {
    session: &'s HostSession,
}

impl<'s> Logger<'s> {
    pub(crate) fn new(session: &'s HostSession) -> Self {
        Self { session }
    }

    pub fn log(&self, severity: Severity, msg: &str) -> Result<()> {
        self.session.adapter().log(severity, msg)
    }

    pub fn info(&self, msg: &str) -> Result<()> {
        self.log(Severity::Info, msg)
    }

    pub fn warning(&self, msg: &str) -> Result<()> {
        self.log(Severity::Warning, msg)
    }

    pub fn error(&self, msg: &str) -> Result<()> {
        self.log(Severity::Error, msg)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        hosts::testing::RecordingBridge, HostAdapter, HostKind, Verb, YurlungurError,
    };

    #[test]
    fn test_node_identity_is_the_path() {
        let a = Node::new("|group1|pCube1");
        let b = Node::from("|group1|pCube1");
        assert_eq!(a, b);
        assert_eq!(a.name(), "pCube1");
        assert_eq!(Node::new("/obj/geo1").name(), "geo1");
        assert_ne!(a, Node::new("pCube1"));
    }

    #[test]
    fn test_standalone_file_verbs_are_unavailable() {
        let session = HostSession::standalone();
        let file = session.file();
        let results = [
            file.abc_importer("/a.abc", Vec::new()),
            file.abc_exporter("/a.abc", Vec::new()),
            file.fbx_importer("/a.fbx", Vec::new()),
            file.fbx_exporter("/a.fbx", Vec::new()),
            file.usd_importer("/a.usd", Vec::new()),
            file.usd_exporter("/a.usd", Vec::new()),
        ];
        for result in results {
            assert!(matches!(
                result,
                Err(YurlungurError::CapabilityUnavailable {
                    host: HostKind::Standalone,
                    ..
                })
            ));
        }
        assert!(session.file().new_document().unwrap_err().is_unavailable());
    }

    #[test]
    fn test_unavailable_verb_has_no_side_effect() {
        let bridge = RecordingBridge::new();
        let session = HostSession::new(HostKind::Nuke, bridge.clone());
        let err = session
            .file()
            .fbx_importer("/a.fbx", Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            YurlungurError::CapabilityUnavailable {
                host: HostKind::Nuke,
                verb: Verb::ImportFbx
            }
        ));
        assert!(bridge.requests().is_empty());
    }

    #[test]
    fn test_file_target_keeps_arguments() {
        let bridge = RecordingBridge::new().respond(json!(null));
        let session = HostSession::new(HostKind::Maya, bridge.clone());
        let options = vec![("mode".to_owned(), json!("import"))];
        let target = session
            .file()
            .abc_importer("/shots/a.abc", options.clone())
            .unwrap();
        assert_eq!(target.path, PathBuf::from("/shots/a.abc"));
        assert_eq!(target.format, Format::Alembic);
        assert_eq!(target.direction, Direction::Import);
        assert_eq!(target.options, options);
    }

    #[test]
    fn test_ls_wraps_nodes() {
        let bridge = RecordingBridge::new().respond(json!(["pCube1", "pSphere1"]));
        let session = HostSession::new(HostKind::Maya, bridge.clone());
        let nodes = session.cmd().ls(None).unwrap();
        assert_eq!(nodes, vec![Node::new("pCube1"), Node::new("pSphere1")]);
    }

    #[test]
    fn test_node_types_filters_with_pattern() {
        let bridge = RecordingBridge::new();
        let session = HostSession::new(HostKind::Rumba, bridge.clone());
        let types = session.cmd().node_types("Make*").unwrap();
        assert_eq!(types, vec!["MakeArray", "MakeDict", "MakeSparseBuffer"]);
        assert!(session.cmd().node_types("[").is_err());
    }

    #[test]
    fn test_node_methods_route_through_session() {
        let bridge = RecordingBridge::new()
            .respond(json!("/obj/geo1"))
            .respond(json!(0.5));
        let session = HostSession::new(HostKind::Houdini, bridge.clone());
        let geo = session.node("/obj").create(&session, "geo").unwrap();
        assert_eq!(geo.path(), "/obj/geo1");
        assert_eq!(geo.attr(&session, "tx").unwrap(), json!(0.5));
        geo.delete(&session).unwrap();
        assert!(bridge.last_program().contains("destroy()"));
    }

    /// A host that can only log warnings.
    struct WarningOnly;

    impl HostAdapter for WarningOnly {
        fn kind(&self) -> HostKind {
            HostKind::Nuke
        }

        fn log(&self, severity: Severity, _msg: &str) -> Result<()> {
            match severity {
                Severity::Warning => Ok(()),
                other => Err(self.unavailable(Verb::Log(other))),
            }
        }
    }

    #[test]
    fn test_error_is_not_downgraded_to_warning() {
        let session = HostSession::from_adapter(Arc::new(WarningOnly));
        assert!(session.logger().warning("careful").is_ok());
        let err = session.logger().error("boom").unwrap_err();
        assert!(matches!(
            err,
            YurlungurError::CapabilityUnavailable {
                verb: Verb::Log(Severity::Error),
                ..
            }
        ));
    }
}
