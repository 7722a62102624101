//! Deployment of the service's own configuration file.

use std::path::{Path, PathBuf};

use crate::error::{Component, InstallError, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "SERVICE-INI";

/// Copies the service's configuration from the source tree into the
/// directory the deployed service reads it from.
#[derive(Debug)]
pub struct SettingsCopier {
    target_dir: PathBuf,
    target_file: PathBuf,
    origin_file: PathBuf,
    runner: CommandRunner,
}

impl Component for SettingsCopier {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl SettingsCopier {
    pub fn new(target_dir: PathBuf, origin_file: PathBuf) -> Result<Self> {
        let Some(file_name) = origin_file.file_name() else {
            return Err(InstallError::configuration(
                COMPONENT,
                format!(
                    "the origin configuration path {} has no file name",
                    origin_file.display()
                ),
            ));
        };
        let target_file = target_dir.join(file_name);
        Ok(Self {
            target_dir,
            target_file,
            origin_file,
            runner: CommandRunner::new(COMPONENT),
        })
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    pub fn copy(&self) -> Result<()> {
        let dir = self.target_dir.display().to_string();
        self.runner
            .execute(&["sudo", "mkdir", "-p", dir.as_str()], true)?;

        let origin = self.origin_file.display().to_string();
        let target = self.target_file.display().to_string();
        self.runner.execute(
            &["sudo", "cp", "-u", "-r", origin.as_str(), target.as_str()],
            true,
        )?;
        tracing::debug!("service configuration {origin} copied to {target}");
        Ok(())
    }

    /// Best-effort removal of the whole deployed configuration directory.
    pub fn remove(&self) -> Result<()> {
        let dir = self.target_dir.display().to_string();
        self.runner
            .execute(&["sudo", "rm", "-rd", dir.as_str()], false)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_file_keeps_the_origin_file_name() {
        let copier = SettingsCopier::new(
            PathBuf::from("/etc/coll"),
            PathBuf::from("../deployment/config/coll.ini"),
        )
        .unwrap();
        assert_eq!(copier.target_file(), Path::new("/etc/coll/coll.ini"));
    }

    #[test]
    fn test_origin_without_file_name_is_rejected() {
        let err = SettingsCopier::new(PathBuf::from("/etc/coll"), PathBuf::from(".."))
            .unwrap_err();
        assert!(err.to_string().starts_with("[SERVICE-INI]"));
    }
}
