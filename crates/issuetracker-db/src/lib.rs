//! Document store layer for the issue tracker
//!
//! Backends implement [`DocumentBackend`], a small subset of a document
//! database API: filters with exact field equality and `$set` updates.
//! [`connect`] picks a backend from a database URL.
//!
//! ## Feature Flags
//!
//! - `mongodb`: MongoDB backend (`mongodb://` and `mongodb+srv://` URLs)

pub mod backends;
pub mod error;
pub mod identifier;
pub mod traits;
pub mod types;

pub use backends::connect;
pub use backends::memory::MemoryBackend;
#[cfg(feature = "mongodb")]
pub use backends::mongodb::{MongoDBBackend, MongoDBBackendBuilder};
pub use error::{NoSQLError, Result};
pub use identifier::{is_valid_object_id, parse_object_id};
pub use traits::{DocumentBackend, NoSQLBackend};
pub use types::{Document, NoSQLBackendType, UpdateResult};

pub use bson;
