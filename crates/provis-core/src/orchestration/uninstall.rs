//! Teardown sequence mirroring installation in reverse.

use std::path::PathBuf;

use crate::error::Result;
use crate::orchestration::ServiceContext;
use crate::service::UnitFile;

/// What one teardown run removed.
#[derive(Debug, Clone)]
pub struct UninstallReport {
    pub service_name: String,
    pub removed_tree: PathBuf,
    pub removed_unit: PathBuf,
    pub removed_settings_dir: PathBuf,
}

pub struct UninstallOrchestrator {
    context: ServiceContext,
}

impl UninstallOrchestrator {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Stops and disables the service, then removes the deployed tree, the
    /// unit file and the deployed configuration directory. Removals are
    /// best-effort so a partially installed service can still be torn down.
    pub fn execute(&self) -> Result<UninstallReport> {
        let service_name = self.context.service_name().to_string();
        tracing::info!("de-installation initialized for service {service_name}");

        self.context.control.stop()?;
        tracing::info!("service {service_name} stopped");

        self.context.control.disable()?;
        tracing::info!("service {service_name} disabled");

        self.context.installer.remove_tree()?;
        let removed_tree = self.context.installer.base_dir().to_path_buf();
        tracing::info!(
            "directory {} removed with all its content",
            removed_tree.display()
        );

        let removed_unit = self.context.config.unit_path()?;
        UnitFile::remove(&removed_unit)?;
        tracing::info!("unit file {} removed", removed_unit.display());

        self.context.settings.remove()?;
        let removed_settings_dir = self.context.config.service_ini_dir()?;
        tracing::info!("directory {} removed", removed_settings_dir.display());

        tracing::info!("service {service_name} uninstalled");
        Ok(UninstallReport {
            service_name,
            removed_tree,
            removed_unit,
            removed_settings_dir,
        })
    }
}
