use std::{path::PathBuf, process::ExitCode, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt};
use yurlungur_app::{pip, App, AppConfig, AppLoader, Locator};
use yurlungur_core::{detect, use_host, HostKind, HostLogLayer, HostSession, ProcessEnv};

#[derive(Debug, Parser)]
#[command(name = "yurlungur", version, about = "yurlungur console")]
struct Args {
    /// Run a program passed in as a string in the given application.
    #[clap(long, short, num_args = 2, value_names = ["CMD", "APP"])]
    command: Option<Vec<String>>,

    /// Use the given host module instead of detecting one.
    #[clap(long, short, value_name = "MOD")]
    environ: Option<String>,

    /// Install Qt for Python.
    #[clap(long, short)]
    qt: bool,

    /// Install ptvsd.
    #[clap(long, short)]
    ptvsd: bool,

    /// Install the shotgun API.
    #[clap(long, short)]
    shotgun: bool,

    /// Config file. Defaults to $YURLUNGUR_CONFIG, then the user config directory.
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(long, default_value = "info")]
    log_level: String,

    #[clap(long, default_value = "auto")]
    log_file: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = AppConfig::load(args.config.as_deref())?;
    let loader = AppLoader::new(config.clone());
    let session = match &args.environ {
        Some(module) => use_host(module, &loader)
            .with_context(|| format!("Failed to use host {module}"))?,
        None => detect(&ProcessEnv::current(), &loader),
    };

    // Kept until exit so buffered log lines are flushed
    let _guard = setup_tracing(&args, &session)?;
    tracing::debug!("Running in {}", session.kind());

    if let Some(command) = &args.command {
        let [cmd, app] = command.as_slice() else {
            bail!("--command takes a program and an application");
        };
        let Ok(kind) = HostKind::from_name(app) else {
            let available: Vec<&str> = HostKind::all().map(|kind| kind.name()).collect();
            println!("{app} is not found. {available:?}");
            return Ok(ExitCode::FAILURE);
        };
        let app = App::new(kind, &config)?;
        let output = app.shell(cmd)?;
        if !output.is_empty() {
            println!("{output}");
        }
    }

    let packages: Vec<&str> = [
        (args.qt, pip::QT_PACKAGE),
        (args.ptvsd, pip::PTVSD_PACKAGE),
        (args.shotgun, pip::SHOTGUN_PACKAGE),
    ]
    .into_iter()
    .filter_map(|(requested, package)| requested.then_some(package))
    .collect();
    if !packages.is_empty() {
        let python = pip::python_for(session.kind(), &config, &Locator::from_env())
            .context("Failed to find a Python interpreter")?;
        for package in packages {
            pip::install(&python, package)?;
        }
    }

    if args.command.is_none() && args.environ.is_none() && !args.qt && !args.ptvsd && !args.shotgun
    {
        println!("yurlungur v.{} ({})", env!("CARGO_PKG_VERSION"), session.kind());
    }

    Ok(ExitCode::SUCCESS)
}

fn setup_tracing(
    args: &Args,
    session: &HostSession,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Set up log file
    let log_file_path = if args.log_file != "auto" {
        let path = PathBuf::from(&args.log_file);
        if path.exists() {
            bail!("Log file already exists: {}", path.display());
        }
        path
    } else {
        let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let filename = format!("yurlungur-{time}.log");
        dirs::data_local_dir()
            .map(|p| p.join("yurlungur").join(&filename))
            .unwrap_or_else(|| PathBuf::from(&filename))
    };
    let dir = match log_file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let filename = log_file_path
        .file_name()
        .context("Log file path has no file name")?;

    // Create log file appender
    let appender = tracing_appender::rolling::never(&dir, filename);
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    let log_level = tracing::Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    let stdout_layer = fmt::Subscriber::builder()
        .with_max_level(log_level)
        .without_time()
        .finish();
    let logfile_layer = fmt::Layer::default()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking_appender);
    // Only an embedded host runtime gets our log lines
    let host_layer = HostLogLayer::for_session(session);
    tracing::subscriber::set_global_default(
        stdout_layer.with(logfile_layer).with(host_layer),
    )
    .context("Unable to set global tracing subscriber")?;

    tracing::info!("Saving logs to {}", log_file_path.display());
    Ok(guard)
}
