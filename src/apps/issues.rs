//! Issues app
//!
//! Issues belong to a project named in the URL. The project is fixed at
//! creation and is never exposed or writable through request bodies.

pub mod models;
pub mod serializers;
pub mod store;
pub mod urls;
pub mod views;
