//! Virtual environment management.

use std::path::{Path, PathBuf};

use crate::error::{Component, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "VENV";

/// Creates and populates the service's virtual environment. Everything
/// runs under sudo since the environment lives in a system path.
pub struct VenvManager {
    path: PathBuf,
    runner: CommandRunner,
}

impl Component for VenvManager {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl VenvManager {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            runner: CommandRunner::new(COMPONENT),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The interpreter inside the environment; deployed entry points are
    /// rewritten to it.
    pub fn python(&self) -> PathBuf {
        self.path.join("bin/python3")
    }

    /// Builds the environment from scratch; `--clear` wipes a previous one
    /// at the same path.
    pub fn create(&self) -> Result<()> {
        let path = self.path.display().to_string();
        self.runner.execute(
            &["sudo", "python3", "-m", "venv", "--clear", path.as_str()],
            true,
        )?;
        Ok(())
    }

    /// Installs one package into the environment via its own pip.
    pub fn install_package(&self, package: &str) -> Result<()> {
        let pip = self.path.join("bin/pip3").display().to_string();
        self.runner
            .execute(&["sudo", pip.as_str(), "install", package], true)?;
        Ok(())
    }
}
