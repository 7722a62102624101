//! Interactive flow for choosing the installation target.
//!
//! Prompts for the values the command line did not provide.
//! Uses dialoguer for terminal UI prompts.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

/// Answers collected from the operator.
#[derive(Debug, Clone)]
pub struct InteractiveAnswers {
    /// Configuration file path, or just the service short name.
    pub config: String,
    /// Whether the service should write to the test database.
    pub test_database: bool,
}

/// Interactive flow for collecting installation inputs.
#[derive(Default)]
pub struct InteractiveFlow {
    theme: ColorfulTheme,
}

impl InteractiveFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts for the configuration file and the database choice.
    pub fn collect(&self) -> Result<InteractiveAnswers> {
        self.print_header();

        let config: String = Input::with_theme(&self.theme)
            .with_prompt("Configuration file, or just the service short name")
            .interact_text()?;

        let test_database = Confirm::with_theme(&self.theme)
            .with_prompt("Install against the test database?")
            .default(false)
            .interact()?;

        Ok(InteractiveAnswers {
            config,
            test_database,
        })
    }

    fn print_header(&self) {
        println!();
        println!("{}", style("  Provis Service Installer").bold().cyan());
        println!();
    }
}
