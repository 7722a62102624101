//! Uniform error type shared by every provisioning component.
//!
//! All failures render as `[COMPONENT] message` so a run log (or a bare
//! stderr line) always names the component that gave up.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InstallError>;

/// The single error taxonomy of the installer.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Missing or malformed configuration input: absent layer files,
    /// unparseable documents, missing required options.
    #[error("[{component}] {message}")]
    Configuration {
        component: &'static str,
        message: String,
    },

    /// A module name did not resolve to exactly one deployable file.
    #[error("[{component}] {message}")]
    ModuleResolution {
        component: &'static str,
        message: String,
    },

    /// An external command marked must-succeed did not.
    #[error("[{component}] {message}")]
    ExternalCommand {
        component: &'static str,
        message: String,
    },

    /// Contradictory or otherwise invalid invocation.
    #[error("[{component}] {message}")]
    Usage {
        component: &'static str,
        message: String,
    },

    /// Direct filesystem access failed outside of any external command.
    #[error("[{component}] {message}")]
    Filesystem {
        component: &'static str,
        message: String,
    },
}

impl InstallError {
    pub fn configuration(component: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            component,
            message: message.into(),
        }
    }

    pub fn module_resolution(component: &'static str, message: impl Into<String>) -> Self {
        Self::ModuleResolution {
            component,
            message: message.into(),
        }
    }

    pub fn external_command(component: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalCommand {
            component,
            message: message.into(),
        }
    }

    pub fn usage(component: &'static str, message: impl Into<String>) -> Self {
        Self::Usage {
            component,
            message: message.into(),
        }
    }

    pub fn filesystem(component: &'static str, message: impl Into<String>) -> Self {
        Self::Filesystem {
            component,
            message: message.into(),
        }
    }

    /// Tag of the component that raised the error.
    pub fn component(&self) -> &'static str {
        match self {
            Self::Configuration { component, .. }
            | Self::ModuleResolution { component, .. }
            | Self::ExternalCommand { component, .. }
            | Self::Usage { component, .. }
            | Self::Filesystem { component, .. } => component,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::ModuleResolution { message, .. }
            | Self::ExternalCommand { message, .. }
            | Self::Usage { message, .. }
            | Self::Filesystem { message, .. } => message,
        }
    }
}

/// Capability implemented by everything that reports under a component tag.
///
/// The default constructors keep call sites short: a component fails with
/// `self.configuration_error(...)` instead of repeating its own tag.
pub trait Component {
    /// Tag embedded in log lines and error renderings, e.g. `VENV`.
    fn component(&self) -> &'static str;

    fn configuration_error(&self, message: impl Into<String>) -> InstallError {
        InstallError::configuration(self.component(), message)
    }

    fn resolution_error(&self, message: impl Into<String>) -> InstallError {
        InstallError::module_resolution(self.component(), message)
    }

    fn command_error(&self, message: impl Into<String>) -> InstallError {
        InstallError::external_command(self.component(), message)
    }

    fn filesystem_error(&self, message: impl Into<String>) -> InstallError {
        InstallError::filesystem(self.component(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl Component for Probe {
        fn component(&self) -> &'static str {
            "PROBE"
        }
    }

    #[test]
    fn test_error_renders_component_and_message() {
        let err = InstallError::configuration("CONFIG", "no section [SERVICE]");
        assert_eq!(err.to_string(), "[CONFIG] no section [SERVICE]");
        assert_eq!(err.component(), "CONFIG");
        assert_eq!(err.message(), "no section [SERVICE]");
    }

    #[test]
    fn test_component_trait_tags_errors() {
        let err = Probe.command_error("exit code 1");
        assert!(matches!(err, InstallError::ExternalCommand { .. }));
        assert_eq!(err.to_string(), "[PROBE] exit code 1");
    }

    #[test]
    fn test_variants_share_rendering_shape() {
        let errors = [
            InstallError::configuration("A", "m"),
            InstallError::module_resolution("A", "m"),
            InstallError::external_command("A", "m"),
            InstallError::usage("A", "m"),
            InstallError::filesystem("A", "m"),
        ];
        for err in errors {
            assert_eq!(err.to_string(), "[A] m");
        }
    }
}
