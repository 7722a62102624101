//! Unit file generation from templates.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigDocument;
use crate::config::parser;
use crate::error::{Component, InstallError, Result};
use crate::exec::CommandRunner;

const COMPONENT: &str = "SYSTEMD-UNIT";

const SECTION_UNIT: &str = "Unit";
const SECTION_SERVICE: &str = "Service";
const OPTION_DESCRIPTION: &str = "Description";
const OPTION_EXEC_START: &str = "ExecStart";
const OPTION_EXEC_STOP: &str = "ExecStop";
const OPTION_WORKING_DIRECTORY: &str = "WorkingDirectory";

/// Resolved values filled into a unit template. Only supplied fields
/// overwrite template defaults.
pub struct UnitFields {
    exec_start: String,
    working_directory: String,
    description: Option<String>,
    exec_stop: Option<String>,
}

impl UnitFields {
    pub fn new(exec_start: impl Into<String>, working_directory: impl Into<String>) -> Self {
        Self {
            exec_start: exec_start.into(),
            working_directory: working_directory.into(),
            description: None,
            exec_stop: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Web flavors supervise through matching start and stop commands.
    pub fn with_exec_stop(mut self, exec_stop: impl Into<String>) -> Self {
        self.exec_stop = Some(exec_stop.into());
        self
    }
}

/// Renders the supervisor's unit file from an ini template.
///
/// Option names keep their case throughout, and the result is serialized
/// as `key=value` without padding; the consuming supervisor requires that
/// exact shape.
#[derive(Debug)]
pub struct UnitFile {
    template: ConfigDocument,
    target_file: PathBuf,
}

impl Component for UnitFile {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl UnitFile {
    /// Loads the template eagerly so a missing or malformed template fails
    /// before any service state has been touched.
    pub fn load(template_file: &Path, target_file: PathBuf) -> Result<Self> {
        let template = parser::parse_file(template_file)
            .map_err(|err| InstallError::configuration(COMPONENT, err.message().to_string()))?;
        Ok(Self {
            template,
            target_file,
        })
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    /// Writes the unit file with the resolved fields filled in and returns
    /// the target path.
    pub fn create(&self, fields: &UnitFields) -> Result<PathBuf> {
        let mut unit = self.template.clone();
        if let Some(description) = &fields.description {
            unit.set(SECTION_UNIT, OPTION_DESCRIPTION, description.as_str());
        }
        unit.set(SECTION_SERVICE, OPTION_EXEC_START, fields.exec_start.as_str());
        unit.set(
            SECTION_SERVICE,
            OPTION_WORKING_DIRECTORY,
            fields.working_directory.as_str(),
        );
        if let Some(exec_stop) = &fields.exec_stop {
            unit.set(SECTION_SERVICE, OPTION_EXEC_STOP, exec_stop.as_str());
        }

        fs::write(&self.target_file, unit.to_ini_string(false)).map_err(|err| {
            self.filesystem_error(format!(
                "cannot write unit file {}: {err}",
                self.target_file.display()
            ))
        })?;
        tracing::debug!("unit file written to {}", self.target_file.display());
        Ok(self.target_file.clone())
    }

    /// Best-effort removal of a previously generated unit file; absence is
    /// only reported, never fatal. Needs no template, so teardown works
    /// even when the template directory is gone.
    pub fn remove(target_file: &Path) -> Result<()> {
        let target = target_file.display().to_string();
        CommandRunner::new(COMPONENT).execute(&["sudo", "rm", "-fv", target.as_str()], false)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "[Unit]\nDescription=placeholder\nAfter=network.target\n\n\
                            [Service]\nType=simple\nExecStart=/bin/false\nRestart=on-failure\n\n\
                            [Install]\nWantedBy=multi-user.target\n";

    fn unit_in(dir: &Path) -> UnitFile {
        let template_path = dir.join("template.service");
        fs::write(&template_path, TEMPLATE).unwrap();
        UnitFile::load(&template_path, dir.join("demo.service")).unwrap()
    }

    #[test]
    fn test_create_overwrites_only_supplied_fields() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());

        let target = unit
            .create(&UnitFields::new("/opt/demo/app.py", "/opt/demo"))
            .unwrap();

        let written = fs::read_to_string(target).unwrap();
        assert!(written.contains("Description=placeholder\n"));
        assert!(written.contains("ExecStart=/opt/demo/app.py\n"));
        assert!(written.contains("WorkingDirectory=/opt/demo\n"));
        assert!(written.contains("Type=simple\n"));
        assert!(written.contains("Restart=on-failure\n"));
        assert!(written.contains("WantedBy=multi-user.target\n"));
        assert!(!written.contains("/bin/false"));
    }

    #[test]
    fn test_create_with_description_and_stop_command() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());

        let fields = UnitFields::new("/srv/apachectl start", "/srv")
            .with_description("Demo web application")
            .with_exec_stop("/srv/apachectl stop");
        unit.create(&fields).unwrap();

        let written = fs::read_to_string(dir.path().join("demo.service")).unwrap();
        assert!(written.contains("Description=Demo web application\n"));
        assert!(written.contains("ExecStart=/srv/apachectl start\n"));
        assert!(written.contains("ExecStop=/srv/apachectl stop\n"));
    }

    #[test]
    fn test_serialization_has_no_delimiter_padding() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        unit.create(&UnitFields::new("/opt/app", "/opt")).unwrap();

        let written = fs::read_to_string(dir.path().join("demo.service")).unwrap();
        assert!(!written.contains(" = "));
    }

    #[test]
    fn test_missing_template_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = UnitFile::load(
            &dir.path().join("absent.service"),
            dir.path().join("demo.service"),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("[SYSTEMD-UNIT]"));
        assert!(err.to_string().contains("absent.service"));
    }

    #[test]
    fn test_option_case_survives_the_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(dir.path());
        unit.create(&UnitFields::new("/opt/app", "/opt")).unwrap();

        let written = fs::read_to_string(dir.path().join("demo.service")).unwrap();
        assert!(written.contains("WorkingDirectory="));
        assert!(!written.contains("workingdirectory="));
        assert!(written.contains("[Unit]"));
        assert!(written.contains("[Service]"));
    }
}
