//! Common types shared by the NoSQL backends

use bson::Bson;

pub use bson::Document;

/// Kinds of document store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSQLBackendType {
	/// Process-local store, used for development and tests
	Memory,
	MongoDB,
}

impl std::fmt::Display for NoSQLBackendType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			NoSQLBackendType::Memory => write!(f, "memory"),
			NoSQLBackendType::MongoDB => write!(f, "mongodb"),
		}
	}
}

/// Outcome of an update operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
	/// Number of documents that matched the filter
	pub matched_count: u64,
	/// Number of documents actually changed
	pub modified_count: u64,
	pub upserted_count: u64,
	pub upserted_id: Option<String>,
}

impl UpdateResult {
	pub fn new(
		matched_count: u64,
		modified_count: u64,
		upserted_count: u64,
		upserted_id: Option<String>,
	) -> Self {
		Self {
			matched_count,
			modified_count,
			upserted_count,
			upserted_id,
		}
	}
}

/// Render a document id the way backends report it: hex for ObjectIds,
/// the raw value for strings.
pub(crate) fn id_to_string(id: &Bson) -> String {
	match id {
		Bson::ObjectId(oid) => oid.to_hex(),
		Bson::String(s) => s.clone(),
		other => other.to_string(),
	}
}
