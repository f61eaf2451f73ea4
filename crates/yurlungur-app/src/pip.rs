use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use glob::Pattern;
use yurlungur_core::{HostKind, Result, Verb, YurlungurError};

use crate::{App, AppConfig, Locator, Platform};

pub const QT_PACKAGE: &str = "PySide2";
pub const PTVSD_PACKAGE: &str = "ptvsd";
pub const SHOTGUN_PACKAGE: &str = "shotgun_api3";

/// Install `package` into the environment of the `python` interpreter.
///
/// # Errors
///
/// Fails with [`YurlungurError::ExternalProcess`] if `python -m pip install`
/// exits unsuccessfully.
pub fn install(python: &Path, package: &str) -> Result<()> {
    tracing::info!("Installing {} with {}", package, python.display());
    let output = Command::new(python)
        .arg("-m")
        .arg("pip")
        .arg("install")
        .arg(package)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::error!("Failed to install {}", package);
        tracing::error!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        tracing::error!("stderr: {}", stderr);
        return Err(YurlungurError::ExternalProcess {
            program: python.display().to_string(),
            status: output.status,
            stderr,
        });
    }

    tracing::info!("Done installing {}", package);
    Ok(())
}

/// Where a host keeps the Python its scripts run in.
enum HostPython {
    /// The headless interpreter is a Python interpreter.
    Interpreter,
    /// A separate interpreter shipped with the host. Directory globs are
    /// relative to the located program; leading `../` steps up.
    Bundled(&'static [&'static str]),
}

fn host_python(kind: HostKind) -> Option<HostPython> {
    let python = match kind {
        HostKind::Maya | HostKind::Houdini | HostKind::C4d => HostPython::Interpreter,
        HostKind::Blender => HostPython::Bundled(&["*/python/bin", "../Resources/*/python/bin"]),
        HostKind::Nuke => HostPython::Bundled(&["."]),
        HostKind::Max => HostPython::Bundled(&["Python"]),
        HostKind::Ue4 => {
            HostPython::Bundled(&["../ThirdParty/Python3/*", "../ThirdParty/Python3/*/bin"])
        }
        _ => return None,
    };
    Some(python)
}

/// Search the directories next to `program` for a Python executable. When a
/// glob matches several, the last in sort order (the newest version) wins.
fn bundled_python(
    kind: HostKind,
    program: &Path,
    dirs: &[&str],
    platform: Platform,
) -> Result<PathBuf> {
    let names: &[&str] = match platform {
        Platform::Windows => &["python.exe"],
        Platform::Linux | Platform::Mac => &["python3", "python3.*", "python"],
    };
    let start = program.parent().unwrap_or_else(|| Path::new("."));

    let mut candidates = Vec::new();
    for dir in dirs {
        let mut base = start.to_path_buf();
        let mut rest = *dir;
        while let Some(stripped) = rest.strip_prefix("../") {
            base.pop();
            rest = stripped;
        }
        let base = Pattern::escape(&base.to_string_lossy());
        for name in names {
            let pattern = format!("{base}/{rest}/{name}");
            let mut found: Vec<PathBuf> = glob::glob(&pattern)?
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_file() && !path.to_string_lossy().ends_with("-config"))
                .collect();
            found.sort();
            if let Some(python) = found.pop() {
                return Ok(python);
            }
            candidates.push(pattern);
        }
    }

    Err(YurlungurError::ExecutableNotFound {
        host: kind,
        candidates,
    })
}

/// The interpreter packages are installed into.
///
/// That is the host's headless interpreter when it is Python itself (`mayapy`,
/// `hython`, `c4dpy`), the Python bundled next to the host (Blender, Nuke,
/// 3ds Max, Unreal), or `python3`/`python` outside any host. Hosts without a
/// pip-capable interpreter fail with [`YurlungurError::CapabilityUnavailable`].
pub fn python_for(kind: HostKind, config: &AppConfig, locator: &Locator) -> Result<PathBuf> {
    if kind == HostKind::Standalone {
        let explicit = config.host(HostKind::Standalone).executable;
        return locator
            .find(HostKind::Standalone, "python3", explicit.as_deref())
            .or_else(|_| locator.find(HostKind::Standalone, "python", explicit.as_deref()));
    }

    let Some(python) = host_python(kind) else {
        return Err(YurlungurError::unavailable(kind, Verb::InstallPackage));
    };
    let app = App::with_locator(kind, config, locator.clone())?;
    let interpreter = app
        .interpreter()
        .ok_or_else(|| YurlungurError::ExecutableNotFound {
            host: kind,
            candidates: Vec::new(),
        })?;
    match python {
        HostPython::Interpreter => Ok(interpreter.to_owned()),
        HostPython::Bundled(dirs) => bundled_python(kind, interpreter, dirs, locator.platform()),
    }
}
