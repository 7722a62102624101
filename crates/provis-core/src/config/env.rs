//! Generation of the deployed service's `env.ini`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigDocument;
use crate::error::{Component, Result};

/// Writes the environment-specific settings the deployed service reads at
/// runtime: which database to use and how to reach it.
pub struct EnvIniWriter {
    target_file: PathBuf,
}

impl Component for EnvIniWriter {
    fn component(&self) -> &'static str {
        "ENV-INI"
    }
}

impl EnvIniWriter {
    pub fn new(target_file: PathBuf) -> Self {
        Self { target_file }
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    /// Renders a `[DATABASE]` section with db, user, password and host and
    /// writes it to the target file.
    pub fn create(&self, host: &str, db: &str, user: &str, password: &str) -> Result<()> {
        let mut document = ConfigDocument::new();
        document.set("DATABASE", "db", db);
        document.set("DATABASE", "user", user);
        document.set("DATABASE", "password", password);
        document.set("DATABASE", "host", host);

        fs::write(&self.target_file, document.to_ini_string(true)).map_err(|err| {
            self.filesystem_error(format!(
                "cannot write {}: {err}",
                self.target_file.display()
            ))
        })?;
        tracing::debug!("environment settings written to {}", self.target_file.display());
        Ok(())
    }
}
