use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, YurlungurError};

/// The DCC applications a scripting session can be embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    Maya,
    Houdini,
    SubstanceDesigner,
    Blender,
    Ue4,
    Unity,
    Nuke,
    C4d,
    Max,
    Rumba,
    SubstancePainter,
    Marmoset,
    RenderDoc,
    Standalone,
}

impl HostKind {
    /// Priority in which hosts are probed. The first match wins.
    pub const DETECTION_ORDER: [HostKind; 13] = [
        HostKind::Maya,
        HostKind::Houdini,
        HostKind::SubstanceDesigner,
        HostKind::Blender,
        HostKind::Ue4,
        HostKind::Unity,
        HostKind::Nuke,
        HostKind::C4d,
        HostKind::Max,
        HostKind::Rumba,
        HostKind::SubstancePainter,
        HostKind::Marmoset,
        HostKind::RenderDoc,
    ];

    pub fn all() -> impl Iterator<Item = HostKind> {
        Self::DETECTION_ORDER
            .into_iter()
            .chain(std::iter::once(HostKind::Standalone))
    }

    pub fn name(&self) -> &'static str {
        match self {
            HostKind::Maya => "maya",
            HostKind::Houdini => "houdini",
            HostKind::SubstanceDesigner => "substance_designer",
            HostKind::Blender => "blender",
            HostKind::Ue4 => "ue4",
            HostKind::Unity => "unity",
            HostKind::Nuke => "nuke",
            HostKind::C4d => "c4d",
            HostKind::Max => "max",
            HostKind::Rumba => "rumba",
            HostKind::SubstancePainter => "substance_painter",
            HostKind::Marmoset => "marmoset",
            HostKind::RenderDoc => "renderdoc",
            HostKind::Standalone => "standalone",
        }
    }

    /// The host's native scripting module.
    pub fn module(&self) -> Option<&'static str> {
        match self {
            HostKind::Maya => Some("maya.cmds"),
            HostKind::Houdini => Some("hou"),
            HostKind::SubstanceDesigner => Some("sd.api"),
            HostKind::Blender => Some("bpy"),
            HostKind::Ue4 => Some("unreal"),
            HostKind::Unity => Some("UnityEngine"),
            HostKind::Nuke => Some("nuke"),
            HostKind::C4d => Some("c4d"),
            HostKind::Max => Some("pymxs"),
            HostKind::Rumba => Some("rumba"),
            HostKind::SubstancePainter => Some("substance_painter"),
            HostKind::Marmoset => Some("mset"),
            HostKind::RenderDoc => Some("renderdoc"),
            HostKind::Standalone => None,
        }
    }

    /// Substring of the interpreter path that identifies the host.
    ///
    /// Hosts without a marker are only detected through their module being
    /// loaded.
    pub fn executable_marker(&self) -> Option<&'static str> {
        match self {
            HostKind::Maya => Some("maya"),
            HostKind::SubstanceDesigner => Some("Substance Designer"),
            HostKind::Blender => Some("Blender"),
            HostKind::Ue4 => Some("UE4Editor"),
            HostKind::Nuke => Some("Nuke"),
            HostKind::C4d => Some("Cinema 4D"),
            HostKind::Max => Some("3dsmax"),
            HostKind::SubstancePainter => Some("Substance Painter"),
            HostKind::Houdini
            | HostKind::Unity
            | HostKind::Rumba
            | HostKind::Marmoset
            | HostKind::RenderDoc
            | HostKind::Standalone => None,
        }
    }

    /// Whether the executable path names this host.
    ///
    /// The marker has to appear as a word inside a single path component,
    /// ignoring case. Digits may follow it (`maya2024`, `Nuke14.0v5`), as may
    /// an interpreter suffix (`mayapy`, `3dsmaxbatch`); other letters or `_`
    /// may not touch it, so `/home/mayank` and `nuke_tools` do not match.
    pub fn matches_executable(&self, executable: &Path) -> bool {
        const SUFFIXES: [&str; 2] = ["py", "batch"];

        let Some(marker) = self.executable_marker() else {
            return false;
        };
        let marker = marker.to_lowercase();
        executable.components().any(|component| {
            let component = component.as_os_str().to_string_lossy().to_lowercase();
            component.match_indices(&marker).any(|(start, _)| {
                let before = component[..start].chars().next_back();
                let rest = &component[start + marker.len()..];
                let rest = SUFFIXES
                    .iter()
                    .find_map(|suffix| rest.strip_prefix(suffix))
                    .unwrap_or(rest);
                let word = |c: char| c.is_alphabetic() || c == '_';
                !before.is_some_and(|c| word(c) || c.is_ascii_digit())
                    && !rest.chars().next().is_some_and(word)
            })
        })
    }

    /// Resolve a host from its short name, its module or the module's top-level
    /// package.
    pub fn from_name(name: &str) -> Result<HostKind> {
        let name = name.trim();
        HostKind::all()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(name)
                    || kind.module().map_or(false, |module| {
                        module == name || module.split('.').next() == Some(name)
                    })
            })
            .ok_or_else(|| YurlungurError::UnknownHost(name.to_owned()))
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HostKind {
    type Err = YurlungurError;

    fn from_str(s: &str) -> Result<Self> {
        HostKind::from_name(s)
    }
}
