//! Shared wiring of installation components for one service.

use crate::config::InstallConfig;
use crate::deploy::SettingsCopier;
use crate::error::Result;
use crate::modules::{ModuleInstaller, ModuleLocator};
use crate::service::ServiceControl;
use crate::venv::VenvManager;

/// Components assembled once from a resolved configuration and shared by
/// every run mode.
pub struct ServiceContext {
    pub(crate) config: InstallConfig,
    pub(crate) control: ServiceControl,
    pub(crate) venv: VenvManager,
    pub(crate) installer: ModuleInstaller,
    pub(crate) settings: SettingsCopier,
    service_name: String,
}

impl ServiceContext {
    pub fn new(config: InstallConfig) -> Result<Self> {
        let service_name = config.service_name()?;
        let control = ServiceControl::new(service_name.as_str());
        let venv = VenvManager::new(config.venv_path()?);
        let locator = ModuleLocator::new(config.module_lookup_paths()?);
        let installer =
            ModuleInstaller::new(locator, config.venv_path()?, config.site_packages_dir()?)?;
        let settings =
            SettingsCopier::new(config.service_ini_dir()?, config.origin_service_ini()?)?;
        Ok(Self {
            config,
            control,
            venv,
            installer,
            settings,
            service_name,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }
}
