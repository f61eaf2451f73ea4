use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yurlungur_core::HostKind;

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "YURLUNGUR_CONFIG";

/// Per-host overrides of where the applications live and how they are run.
///
/// ```json
/// {
///   "hosts": {
///     "maya": { "executable": "/usr/autodesk/maya2024/bin/mayapy" },
///     "rumba": { "shell": ["--python", "{file}"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hosts: BTreeMap<HostKind, HostConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// The headless interpreter used by `shell`.
    pub executable: Option<PathBuf>,
    /// The GUI application started by `run`.
    pub gui: Option<PathBuf>,
    /// Arguments for the interpreter; see [`crate::ShellTemplate`].
    pub shell: Option<Vec<String>>,
}

impl AppConfig {
    /// Load the config from `path`, else from `$YURLUNGUR_CONFIG`, else from the
    /// user config directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_owned()),
            None => default_config_path(),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn host(&self, kind: HostKind) -> HostConfig {
        self.hosts.get(&kind).cloned().unwrap_or_default()
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("yurlungur").join("config.json"))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("config.json"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.host(HostKind::Maya), HostConfig::default());
    }

    #[test]
    fn test_load_host_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "hosts": { "substance_painter": { "gui": "/opt/painter/painter", "shell": ["{file}"] } } }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        let painter = config.host(HostKind::SubstancePainter);
        assert_eq!(painter.gui, Some(PathBuf::from("/opt/painter/painter")));
        assert_eq!(painter.shell, Some(vec!["{file}".to_owned()]));
        assert_eq!(painter.executable, None);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "hosts": { "photoshop": {} } }"#).unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(format!("{err}").contains("Failed to parse config"));
    }
}
