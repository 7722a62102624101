//! Provis - Linux service installer
//!
//! Usage:
//!   provis ./install/coll.install.ini          # Install a service
//!   provis coll --update-only                  # Refresh deployed code only
//!   provis coll --uninstall                    # Tear a service down
//!   provis                                     # Interactive mode

mod interactive;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use provis_core::config::InstallConfig;
use provis_core::error::InstallError;
use provis_core::orchestration::{
    InstallOptions, InstallOrchestrator, ServiceContext, UninstallOrchestrator,
};

use crate::interactive::InteractiveFlow;

const COMPONENT: &str = "CMDLINE";

const SHORT_NAME_CONFIG_DIR: &str = "./install";
const LOG_DIR: &str = "./install/log";

#[derive(Parser)]
#[command(name = "provis")]
#[command(about = "Provision Python application services on a Linux host", long_about = None)]
struct Cli {
    /// Installation configuration file, or just the service short name
    config: Option<String>,

    /// Point the installed service at the test database
    #[arg(long = "db-test")]
    db_test: bool,

    /// Uninstall the service instead of installing it
    #[arg(short = 'u', long)]
    uninstall: bool,

    /// Start the service immediately after installation
    #[arg(long)]
    start: bool,

    /// Refresh deployed code and configuration without recreating the
    /// virtual environment or re-registering the service
    #[arg(long)]
    update_only: bool,
}

/// A fully resolved run request: configuration located and readable,
/// contradictory flags rejected, interactive answers folded in.
struct Request {
    config_path: PathBuf,
    config_stem: String,
    test_database: bool,
    uninstall: bool,
    start: bool,
    update_only: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let request = resolve_request(cli)?;
    init_logging(&request.config_stem);

    let config = InstallConfig::load(&request.config_path)?;
    let context = ServiceContext::new(config)?;

    if request.uninstall {
        let report = UninstallOrchestrator::new(context).execute()?;
        println!(
            "{} service {} uninstalled",
            style("✓").green(),
            style(&report.service_name).bold()
        );
    } else {
        let options = InstallOptions::new()
            .with_update_only(request.update_only)
            .with_test_database(request.test_database)
            .with_start(request.start);
        let report = InstallOrchestrator::new(context, options).execute()?;
        println!(
            "{} service {} ({}) deployed, {} modules",
            style("✓").green(),
            style(&report.service_name).bold(),
            report.flavor.label(),
            report.modules
        );
        if let Some(unit) = &report.unit_file {
            println!("  unit: {}", unit.display());
        }
        if report.started {
            println!("  started");
        }
    }

    Ok(())
}

fn resolve_request(cli: Cli) -> Result<Request> {
    if cli.uninstall && cli.start {
        return Err(InstallError::usage(
            COMPONENT,
            "instructed both to uninstall and to start the service, the two options contradict each other",
        )
        .into());
    }
    if cli.uninstall && cli.update_only {
        return Err(InstallError::usage(
            COMPONENT,
            "instructed both to uninstall and to update the service, the two options contradict each other",
        )
        .into());
    }

    let (config, test_database) = match cli.config {
        Some(config) => (config, cli.db_test),
        None => {
            let answers = InteractiveFlow::new().collect()?;
            (answers.config, answers.test_database || cli.db_test)
        }
    };

    let config_path = resolve_config_path(&config)?;
    ensure_readable(&config_path)?;

    let config_stem = config_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "install".to_string());

    Ok(Request {
        config_path,
        config_stem,
        test_database,
        uninstall: cli.uninstall,
        start: cli.start,
        update_only: cli.update_only,
    })
}

fn resolve_config_path(config: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(config);
    let path = if direct.exists() {
        direct
    } else {
        // A bare short name resolves to the conventional location.
        let guessed = Path::new(SHORT_NAME_CONFIG_DIR).join(format!("{config}.install.ini"));
        if !guessed.exists() {
            return Err(InstallError::configuration(
                COMPONENT,
                format!(
                    "the installation configuration path {} points to an invalid location",
                    guessed.display()
                ),
            )
            .into());
        }
        guessed
    };

    if !path.is_file() {
        return Err(InstallError::configuration(
            COMPONENT,
            format!(
                "the installation configuration path {} does not point to an actual file",
                path.display()
            ),
        )
        .into());
    }
    Ok(path)
}

/// The installer usually runs under sudo; a plain-permission failure on
/// the config file gets a hint instead of a bare io error.
fn ensure_readable(path: &Path) -> Result<()> {
    match File::open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            Err(InstallError::configuration(
                COMPONENT,
                format!(
                    "the installation configuration {} cannot be opened in the current security context, try with sudo ({err})",
                    path.display()
                ),
            )
            .into())
        }
        Err(err) => Err(InstallError::filesystem(
            COMPONENT,
            format!(
                "cannot open the installation configuration {}: {err}",
                path.display()
            ),
        )
        .into()),
    }
}

/// Stdout gets INFO (overridable through `RUST_LOG`); a per-run file under
/// `./install/log/` gets everything at DEBUG. When the log directory
/// cannot be created the run carries on with stdout only.
fn init_logging(config_stem: &str) {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    let log_file = open_log_file(config_stem);
    match log_file {
        Some((path, file)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);
            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .init();
            tracing::debug!("run log file: {}", path.display());
        }
        None => {
            tracing_subscriber::registry().with(stdout_layer).init();
        }
    }
}

fn open_log_file(config_stem: &str) -> Option<(PathBuf, File)> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir).ok()?;
    let name = format!(
        "{}_{config_stem}.log",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    );
    let path = log_dir.join(name);
    let file = File::create(&path).ok()?;
    Some((path, file))
}
