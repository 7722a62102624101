//! External command execution.

pub mod runner;

pub use runner::{CommandOutcome, CommandRunner};
