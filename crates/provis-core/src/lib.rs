//! Provis Core Library
//!
//! Provides the domain logic for provisioning Python application services
//! on a Linux host: layered configuration resolution, module deployment,
//! unit-file generation and service state control.

pub mod config;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod modules;
pub mod orchestration;
pub mod service;
pub mod venv;
pub mod web;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigDocument, EnvIniWriter, InstallConfig, RequiredOptionSet, ServiceFlavor,
    };

    // Errors
    pub use crate::error::{Component, InstallError, Result};

    // Execution
    pub use crate::exec::{CommandOutcome, CommandRunner};

    // Deployment
    pub use crate::deploy::SettingsCopier;
    pub use crate::modules::{ModuleInstaller, ModuleLocator};
    pub use crate::venv::VenvManager;

    // Service supervision
    pub use crate::service::{ServiceControl, UnitFields, UnitFile};

    // Web application extras
    pub use crate::web::{ApacheConfigurator, ApacheSettings, StaticFiles};

    // Orchestration
    pub use crate::orchestration::{
        InstallOptions, InstallOrchestrator, InstallReport, ServiceContext,
        UninstallOrchestrator, UninstallReport,
    };
}
