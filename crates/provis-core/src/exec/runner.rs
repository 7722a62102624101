//! Execution of external commands with the warn-or-fail policy.

use std::process::Command;

use crate::error::{Component, Result};

/// Captured result of one external command.
#[derive(Debug)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs on behalf of one component.
///
/// Success is exit code zero. A failing command either aborts the run with
/// an [`ExternalCommand`](crate::InstallError::ExternalCommand) error or
/// degrades to a warning, depending on the caller's `must_succeed` policy.
/// That single flag is the installer's whole failure-handling vocabulary;
/// there are no retries and no timeouts.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    component: &'static str,
}

impl Component for CommandRunner {
    fn component(&self) -> &'static str {
        self.component
    }
}

impl CommandRunner {
    /// A runner reporting under the tag of the component it serves.
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Runs `command`, capturing both output streams.
    ///
    /// A spawn failure (the program cannot be started at all) is classified
    /// like a non-zero exit so nothing escapes the uniform error type.
    pub fn execute(&self, command: &[&str], must_succeed: bool) -> Result<CommandOutcome> {
        let Some((program, args)) = command.split_first() else {
            return Err(self.command_error("cannot execute an empty command"));
        };

        let outcome = match Command::new(program).args(args).output() {
            Ok(output) => CommandOutcome {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            },
            Err(err) => CommandOutcome {
                success: false,
                code: None,
                stdout: String::new(),
                stderr: err.to_string(),
            },
        };

        if outcome.success {
            tracing::debug!(
                component = self.component,
                "executing {command:?} succeeded, stdout: <{}>",
                outcome.stdout
            );
            return Ok(outcome);
        }

        let detail = failure_detail(command, &outcome);
        if must_succeed {
            return Err(self.command_error(detail));
        }
        tracing::warn!(component = self.component, "{detail}");
        Ok(outcome)
    }
}

fn failure_detail(command: &[&str], outcome: &CommandOutcome) -> String {
    let code = outcome
        .code
        .map_or_else(|| "N/A".to_string(), |code| code.to_string());
    format!(
        "executing {command:?} failed, exit code: {code}, stdout: <{}>, stderr: <{}>",
        outcome.stdout, outcome.stderr
    )
}
