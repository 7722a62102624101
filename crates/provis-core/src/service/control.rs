//! Service state control through systemctl.

use crate::error::{Component, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "SYSTEMCTL";

/// Toggles the service's supervisor state, always under sudo.
///
/// `stop` and `disable` run before (re)installation when the service may
/// not exist yet, so their failures only warn. Registration and start are
/// hard requirements.
pub struct ServiceControl {
    service_name: String,
    runner: CommandRunner,
}

impl Component for ServiceControl {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl ServiceControl {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            runner: CommandRunner::new(COMPONENT),
        }
    }

    pub fn stop(&self) -> Result<()> {
        self.runner.execute(
            &["sudo", "systemctl", "stop", self.service_name.as_str()],
            false,
        )?;
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        self.runner.execute(
            &["sudo", "systemctl", "disable", self.service_name.as_str()],
            false,
        )?;
        Ok(())
    }

    /// Registers the freshly written unit file: reloads the supervisor's
    /// view of unit files, then enables the service.
    pub fn register(&self) -> Result<()> {
        self.runner
            .execute(&["sudo", "systemctl", "daemon-reload"], true)?;
        let unit = format!("{}.service", self.service_name);
        self.runner
            .execute(&["sudo", "systemctl", "enable", unit.as_str()], true)?;
        Ok(())
    }

    pub fn start(&self) -> Result<()> {
        self.runner.execute(
            &["sudo", "systemctl", "start", self.service_name.as_str()],
            true,
        )?;
        Ok(())
    }
}
