//! Project configuration: settings loading and URL wiring

pub mod settings;
pub mod urls;
