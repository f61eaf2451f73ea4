//! One adapter per host application, translating the capability interface into
//! the host's native calls.

mod blender;
mod c4d;
mod houdini;
mod marmoset;
mod max;
mod maya;
mod nuke;
mod renderdoc;
mod rumba;
mod standalone;
mod substance;
mod ue4;
mod unity;

use std::{path::Path, sync::Arc};

use serde_json::Value;

use crate::{
    bridge::python::to_literal, HostAdapter, HostBridge, HostKind, Options, Result, Verb,
    YurlungurError,
};

pub use standalone::Standalone;

impl HostKind {
    /// Build the adapter implementing this host's verbs on top of `bridge`.
    ///
    /// The standalone host ignores the bridge.
    pub fn adapter(&self, bridge: Arc<dyn HostBridge>) -> Box<dyn HostAdapter> {
        match self {
            HostKind::Maya => Box::new(maya::Maya::new(bridge)),
            HostKind::Houdini => Box::new(houdini::Houdini::new(bridge)),
            HostKind::SubstanceDesigner => Box::new(substance::Designer::new(bridge)),
            HostKind::Blender => Box::new(blender::Blender::new(bridge)),
            HostKind::Ue4 => Box::new(ue4::Ue4::new(bridge)),
            HostKind::Unity => Box::new(unity::Unity::new(bridge)),
            HostKind::Nuke => Box::new(nuke::Nuke::new(bridge)),
            HostKind::C4d => Box::new(c4d::C4d::new(bridge)),
            HostKind::Max => Box::new(max::Max::new(bridge)),
            HostKind::Rumba => Box::new(rumba::Rumba::new(bridge)),
            HostKind::SubstancePainter => Box::new(substance::Painter::new(bridge)),
            HostKind::Marmoset => Box::new(marmoset::Marmoset::new(bridge)),
            HostKind::RenderDoc => Box::new(renderdoc::RenderDoc::new(bridge)),
            HostKind::Standalone => Box::new(Standalone),
        }
    }
}

/// Paths are handed to hosts with forward slashes, which every host accepts.
fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Render a value as a Python literal for use inside a script body.
fn lit(value: impl Into<Value>) -> String {
    to_literal(&value.into())
}

/// Render options as `key=value` keyword arguments, each prefixed with `, `.
fn kwargs_tail(options: &Options) -> String {
    options
        .iter()
        .map(|(key, value)| format!(", {}={}", key, to_literal(value)))
        .collect()
}

/// Interpret a host result as a list of names. `None` counts as empty, which is
/// what several hosts return for an empty selection.
fn strings(value: Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(YurlungurError::Bridge(format!(
                    "expected a name, got {other}"
                ))),
            })
            .collect(),
        other => Err(YurlungurError::Bridge(format!(
            "expected a list of names, got {other}"
        ))),
    }
}

/// Fail with [`YurlungurError::HostRejected`] unless the host reported success.
fn ensure_accepted(kind: HostKind, verb: Verb, path: &Path, accepted: bool) -> Result<()> {
    if accepted {
        Ok(())
    } else {
        Err(YurlungurError::HostRejected {
            host: kind,
            verb,
            target: path.display().to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_strings() {
        assert_eq!(strings(json!(null)).unwrap(), Vec::<String>::new());
        assert_eq!(strings(json!(["a", "b"])).unwrap(), vec!["a", "b"]);
        assert_eq!(strings(json!("a")).unwrap(), vec!["a"]);
        assert!(strings(json!([1])).is_err());
    }

    #[test]
    fn test_path_str() {
        assert_eq!(path_str(Path::new("C:\\assets\\a.fbx")), "C:/assets/a.fbx");
    }

    #[test]
    fn test_adapter_kinds() {
        let bridge = testing::RecordingBridge::new();
        for kind in HostKind::all() {
            assert_eq!(kind.adapter(bridge.clone()).kind(), kind);
        }
    }
}
