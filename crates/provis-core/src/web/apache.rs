//! Apache configuration generated through Django's `runmodwsgi`.

use std::path::PathBuf;

use crate::error::{Component, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "APACHE-CONF";

/// Resolved inputs of one `runmodwsgi --setup-only` invocation.
pub struct ApacheSettings {
    pub venv_python: PathBuf,
    pub django_manager: PathBuf,
    /// Directory the generated Apache instance lives in, including its
    /// `apachectl` control script.
    pub server_root: PathBuf,
    pub working_dir: PathBuf,
    pub site_packages: PathBuf,
    pub log_dir: PathBuf,
    pub process_name: String,
    pub port: u16,
}

/// Drives `runmodwsgi` to generate a self-contained Apache instance for a
/// web application.
pub struct ApacheConfigurator {
    settings: ApacheSettings,
    runner: CommandRunner,
}

impl Component for ApacheConfigurator {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl ApacheConfigurator {
    pub fn new(settings: ApacheSettings) -> Self {
        Self {
            settings,
            runner: CommandRunner::new(COMPONENT),
        }
    }

    /// Control script of the generated instance; the unit file starts and
    /// stops the service through it.
    pub fn apachectl(&self) -> PathBuf {
        self.settings.server_root.join("apachectl")
    }

    pub fn configure(&self) -> Result<()> {
        let python = self.settings.venv_python.display().to_string();
        let manager = self.settings.django_manager.display().to_string();
        let port = format!("--port={}", self.settings.port);
        let pythonpath = format!("--pythonpath={}", self.settings.site_packages.display());
        let working_dir = format!(
            "--working-directory={}",
            self.settings.working_dir.display()
        );
        let server_root = format!("--server-root={}", self.settings.server_root.display());
        let log_dir = format!("--log-directory={}", self.settings.log_dir.display());
        let process_name = format!("--process-name={}", self.settings.process_name);

        self.runner.execute(
            &[
                "sudo",
                python.as_str(),
                manager.as_str(),
                "runmodwsgi",
                "--setup-only",
                port.as_str(),
                "--user=www-data",
                "--group=www-data",
                pythonpath.as_str(),
                working_dir.as_str(),
                server_root.as_str(),
                log_dir.as_str(),
                process_name.as_str(),
            ],
            true,
        )?;
        tracing::debug!(
            "Apache instance generated under {}",
            self.settings.server_root.display()
        );
        Ok(())
    }
}
