use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use yurlungur_core::{HostKind, Result, Verb, YurlungurError};

use crate::{AppConfig, HostConfig, Locator};

const SCRIPT: &str = "{script}";
const FILE: &str = "{file}";

/// Arguments for a host's headless interpreter. `{script}` is replaced by the
/// source itself, `{file}` by the path of a temporary file holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTemplate {
    args: Vec<String>,
}

impl ShellTemplate {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in template for a host, if its interpreter can run a script
    /// from the command line.
    pub fn default_for(kind: HostKind) -> Option<Self> {
        let args: &[&str] = match kind {
            HostKind::Maya | HostKind::Houdini => &["-c", SCRIPT],
            HostKind::Blender => &[
                "--background",
                "--factory-startup",
                "--quiet",
                "--python-exit-code",
                "1",
                "--python-expr",
                SCRIPT,
            ],
            HostKind::Ue4 => &["-run=pythonscript", "-script={file}"],
            HostKind::Nuke => &["-t", FILE],
            HostKind::RenderDoc => &["--python", FILE],
            HostKind::C4d | HostKind::Max | HostKind::Marmoset => &[FILE],
            HostKind::SubstanceDesigner
            | HostKind::SubstancePainter
            | HostKind::Unity
            | HostKind::Rumba
            | HostKind::Standalone => return None,
        };
        Some(Self::new(args.iter().copied()))
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn needs_file(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(FILE))
    }

    fn expand(&self, source: &str, file: Option<&Path>) -> Vec<String> {
        let file = file
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.args
            .iter()
            .map(|arg| arg.replace(SCRIPT, source).replace(FILE, &file))
            .collect()
    }
}

/// What a headless interpreter printed. `stdout` is trimmed of trailing
/// whitespace and of the host's own status lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Drop the version banner and the "Blender quit" line Blender prints around
/// a script when `--quiet` is not honoured.
fn strip_status_lines(kind: HostKind, stdout: &str) -> String {
    let stdout = stdout.trim_end();
    if kind != HostKind::Blender {
        return stdout.to_owned();
    }
    let mut lines: Vec<&str> = stdout.lines().collect();
    let banner = lines.first().is_some_and(|line| {
        line.strip_prefix("Blender ")
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    });
    if banner {
        lines.remove(0);
        while lines.first().is_some_and(|line| line.trim().is_empty()) {
            lines.remove(0);
        }
    }
    if lines.last() == Some(&"Blender quit") {
        lines.pop();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
    }
    lines.join("\n")
}

/// Program names of a host: the GUI application and the headless interpreter.
fn programs(kind: HostKind) -> Option<(&'static str, &'static str)> {
    let programs = match kind {
        HostKind::Maya => ("maya", "mayapy"),
        HostKind::Houdini => ("houdini", "hython"),
        HostKind::SubstanceDesigner => ("Substance Designer", "Substance Designer"),
        HostKind::Blender => ("blender", "blender"),
        HostKind::Ue4 => ("UE4Editor", "UE4Editor-Cmd"),
        HostKind::Unity => ("Unity", "Unity"),
        HostKind::Nuke => ("Nuke", "Nuke"),
        HostKind::C4d => ("Cinema 4D", "c4dpy"),
        HostKind::Max => ("3dsmax", "3dsmaxbatch"),
        HostKind::Rumba => ("rumba", "rumba"),
        HostKind::SubstancePainter => ("Adobe Substance 3D Painter", "Adobe Substance 3D Painter"),
        HostKind::Marmoset => ("toolbag", "toolbag"),
        HostKind::RenderDoc => ("qrenderdoc", "qrenderdoc"),
        HostKind::Standalone => return None,
    };
    Some(programs)
}

/// A host application driven from outside: started as a GUI, or used as a
/// headless interpreter.
#[derive(Debug)]
pub struct App {
    kind: HostKind,
    host: HostConfig,
    locator: Locator,
    gui: Option<PathBuf>,
    interpreter: Option<PathBuf>,
    template: Option<ShellTemplate>,
    child: Option<Child>,
}

impl App {
    pub fn new(kind: HostKind, config: &AppConfig) -> Result<Self> {
        Self::with_locator(kind, config, Locator::from_env())
    }

    /// Fails when neither the GUI nor the interpreter of the host can be found.
    pub fn with_locator(kind: HostKind, config: &AppConfig, locator: Locator) -> Result<Self> {
        if programs(kind).is_none() {
            return Err(YurlungurError::unavailable(kind, Verb::Shell));
        }
        let host = config.host(kind);
        let template = host
            .shell
            .clone()
            .map(ShellTemplate::new)
            .or_else(|| ShellTemplate::default_for(kind));

        let mut app = Self {
            kind,
            host,
            locator,
            gui: None,
            interpreter: None,
            template,
            child: None,
        };
        app.gui = app.locate_gui().ok();
        if app.template.is_some() {
            app.interpreter = app.locate_interpreter().ok();
        }
        if app.gui.is_none() && app.interpreter.is_none() {
            // Report the primary program's search
            if app.template.is_some() {
                app.locate_interpreter()?;
            } else {
                app.locate_gui()?;
            }
        }
        Ok(app)
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    /// Whether `shell` can run source in this host.
    pub fn has_shell(&self) -> bool {
        self.template.is_some() && self.interpreter.is_some()
    }

    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    fn locate_gui(&self) -> Result<PathBuf> {
        let (gui, _) = programs(self.kind).unwrap_or_default();
        self.locator.find(self.kind, gui, self.host.gui.as_deref())
    }

    fn locate_interpreter(&self) -> Result<PathBuf> {
        let (_, interpreter) = programs(self.kind).unwrap_or_default();
        self.locator
            .find(self.kind, interpreter, self.host.executable.as_deref())
    }

    /// Start the GUI application without waiting for it.
    pub fn run(&mut self, args: &[String]) -> Result<()> {
        let gui = match &self.gui {
            Some(gui) => gui.clone(),
            None => self.locate_gui()?,
        };
        if self.child.is_some() {
            tracing::warn!("{} is already running, starting another instance", self.kind);
        }
        tracing::info!("Starting {} ({})", self.kind, gui.display());
        let child = Command::new(&gui)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    /// Run `source` in the headless interpreter and return its stdout.
    pub fn shell(&self, source: &str) -> Result<String> {
        self.shell_output(source).map(|output| output.stdout)
    }

    /// Like [`App::shell`], keeping stderr as well. A non-zero exit is an
    /// [`YurlungurError::ExternalProcess`].
    pub fn shell_output(&self, source: &str) -> Result<ShellOutput> {
        let template = self
            .template
            .as_ref()
            .ok_or_else(|| YurlungurError::unavailable(self.kind, Verb::Shell))?;
        let interpreter = match &self.interpreter {
            Some(interpreter) => interpreter.clone(),
            None => self.locate_interpreter()?,
        };

        // Kept alive until the interpreter exits
        let script = if template.needs_file() {
            let mut file = tempfile::Builder::new()
                .prefix("yurlungur-")
                .suffix(".py")
                .tempfile()?;
            file.write_all(source.as_bytes())?;
            file.flush()?;
            Some(file)
        } else {
            None
        };
        let args = template.expand(source, script.as_ref().map(|file| file.path()));

        tracing::debug!("Running {} {:?}", interpreter.display(), args);
        let output = Command::new(&interpreter)
            .args(&args)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!("{} failed", interpreter.display());
            tracing::error!("stdout: {}", String::from_utf8_lossy(&output.stdout));
            tracing::error!("stderr: {}", stderr);
            return Err(YurlungurError::ExternalProcess {
                program: interpreter.display().to_string(),
                status: output.status,
                stderr,
            });
        }

        Ok(ShellOutput {
            stdout: strip_status_lines(self.kind, &String::from_utf8_lossy(&output.stdout)),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Kill the application started by [`App::run`]. Does nothing if none was
    /// started.
    pub fn end(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        tracing::info!("Stopping {}", self.kind);
        if child.try_wait()?.is_none() {
            child.kill()?;
        }
        child.wait()?;
        Ok(())
    }
}
