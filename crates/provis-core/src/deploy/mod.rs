//! Deployment of configuration artifacts.

pub mod settings;

pub use settings::SettingsCopier;
