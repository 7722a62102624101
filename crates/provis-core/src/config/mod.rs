//! Layered ini configuration: parsing, overlay resolution with
//! interpolation, the typed installation view and generated settings files.

pub mod document;
pub mod env;
pub mod install;
pub mod parser;

pub use document::ConfigDocument;
pub use env::EnvIniWriter;
pub use install::{InstallConfig, RequiredOptionSet, ServiceFlavor};
