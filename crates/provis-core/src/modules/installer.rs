//! Deployment of module sources into the service tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Component, InstallError, Result};
use crate::exec::CommandRunner;
use crate::modules::locator::{ModuleLocator, module_file_name};

const COMPONENT: &str = "MODULE";

/// Copies resolved module files into the deployment tree.
///
/// Library modules land in the venv's site-packages; entry-point files
/// land in the base directory, the parent of the venv itself.
pub struct ModuleInstaller {
    locator: ModuleLocator,
    venv_path: PathBuf,
    site_packages: PathBuf,
    base_dir: PathBuf,
    runner: CommandRunner,
}

impl Component for ModuleInstaller {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl ModuleInstaller {
    pub fn new(locator: ModuleLocator, venv_path: PathBuf, site_packages: PathBuf) -> Result<Self> {
        let base_dir = venv_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .ok_or_else(|| {
                InstallError::configuration(
                    COMPONENT,
                    format!(
                        "the venv path {} has no parent directory to deploy into",
                        venv_path.display()
                    ),
                )
            })?
            .to_path_buf();
        Ok(Self {
            locator,
            venv_path,
            site_packages,
            base_dir,
            runner: CommandRunner::new(COMPONENT),
        })
    }

    /// Root of the deployed tree; removed wholesale on uninstall.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Copies a library module into site-packages.
    pub fn install_module(&self, name: &str) -> Result<PathBuf> {
        let source = self.locator.locate(name)?;
        let target = self.site_packages.join(module_file_name(name));
        self.copy_into_place(&source, &target)?;
        Ok(target)
    }

    /// Copies a loose file (wsgi descriptors, web assets) into the base
    /// directory.
    pub fn install_file(&self, name: &str) -> Result<PathBuf> {
        let source = self.locator.locate(name)?;
        let target = self.base_dir.join(module_file_name(name));
        self.copy_into_place(&source, &target)?;
        Ok(target)
    }

    /// Deploys the service's entry point: validates the interpreter
    /// directive, rewrites it to the venv's interpreter and marks the
    /// result executable.
    ///
    /// Validation happens before the target is opened, so a bad source
    /// never truncates a previously deployed entry point.
    pub fn install_main(&self, name: &str) -> Result<PathBuf> {
        let source = self.locator.locate(name)?;
        let text = fs::read_to_string(&source)
            .map_err(|err| self.filesystem_error(format!("cannot read {}: {err}", source.display())))?;

        let (first_line, remainder) = text.split_once('\n').unwrap_or((text.as_str(), ""));
        if !first_line.starts_with("#!") {
            return Err(self.resolution_error(format!(
                "the first line of main module {name} does not contain an interpreter directive"
            )));
        }

        let target = self.base_dir.join(module_file_name(name));
        let deployed = format!(
            "#!{}\n{remainder}",
            self.venv_path.join("bin/python3").display()
        );
        fs::write(&target, deployed)
            .map_err(|err| self.filesystem_error(format!("cannot write {}: {err}", target.display())))?;

        let target_text = target.display().to_string();
        self.runner
            .execute(&["chmod", "-v", "u+x", target_text.as_str()], false)?;
        Ok(target)
    }

    /// Best-effort removal of the whole deployed tree, venv included.
    pub fn remove_tree(&self) -> Result<()> {
        let base = self.base_dir.display().to_string();
        self.runner
            .execute(&["sudo", "rm", "-rd", base.as_str()], false)?;
        Ok(())
    }

    fn copy_into_place(&self, source: &Path, target: &Path) -> Result<()> {
        let Some(parent) = target.parent() else {
            return Err(self.filesystem_error(format!(
                "target {} has no parent directory",
                target.display()
            )));
        };
        let parent = parent.display().to_string();
        let source = source.display().to_string();
        let target = target.display().to_string();
        self.runner
            .execute(&["sudo", "mkdir", "-p", parent.as_str()], true)?;
        self.runner.execute(
            &["sudo", "cp", "-u", "-r", source.as_str(), target.as_str()],
            true,
        )?;
        Ok(())
    }
}
