//! Static asset collection for web applications.

use std::path::{Path, PathBuf};

use crate::error::{Component, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "STATICFILES";

/// Collects a Django application's static assets.
///
/// The application's settings aim `collectstatic` straight at the deployed
/// static directory, so no copy step follows the collection.
pub struct StaticFiles {
    venv_python: PathBuf,
    django_manager: PathBuf,
    target_dir: PathBuf,
    runner: CommandRunner,
}

impl Component for StaticFiles {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl StaticFiles {
    pub fn new(venv_python: PathBuf, django_manager: PathBuf, target_dir: PathBuf) -> Self {
        Self {
            venv_python,
            django_manager,
            target_dir,
            runner: CommandRunner::new(COMPONENT),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn collect(&self) -> Result<()> {
        let python = self.venv_python.display().to_string();
        let manager = self.django_manager.display().to_string();
        self.runner.execute(
            &[
                "sudo",
                python.as_str(),
                manager.as_str(),
                "collectstatic",
                "--noinput",
            ],
            true,
        )?;
        tracing::debug!("static files collected into {}", self.target_dir.display());
        Ok(())
    }
}
