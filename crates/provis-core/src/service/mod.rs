//! Supervisor integration: state control and unit file generation.

pub mod control;
pub mod unit;

pub use control::ServiceControl;
pub use unit::{UnitFields, UnitFile};
