//! Module resolution and deployment.

pub mod installer;
pub mod locator;

pub use installer::ModuleInstaller;
pub use locator::{ModuleLocator, module_file_name};
