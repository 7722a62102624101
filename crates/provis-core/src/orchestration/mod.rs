//! Install, update and uninstall sequences composed from the components.

pub mod context;
pub mod install;
pub mod uninstall;

pub use context::ServiceContext;
pub use install::{InstallOptions, InstallOrchestrator, InstallReport};
pub use uninstall::{UninstallOrchestrator, UninstallReport};
