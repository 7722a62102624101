//! Web application extras: static assets and the generated Apache instance.

pub mod apache;
pub mod statics;

pub use apache::{ApacheConfigurator, ApacheSettings};
pub use statics::StaticFiles;
