//! Document-oriented database trait

use async_trait::async_trait;

use super::NoSQLBackend;
use crate::error::Result;
use crate::types::{Document, UpdateResult};

/// Trait for document-oriented NoSQL databases
///
/// Filters are documents compared field by field with exact equality.
/// Updates use operator documents such as `{"$set": {...}}`.
///
/// # Example
///
/// ```rust
/// use issuetracker_db::{DocumentBackend, MemoryBackend};
/// use bson::doc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let db = MemoryBackend::new();
/// let id = db.insert_one("issues", doc! { "project": "apitest" }).await.unwrap();
///
/// let found = db.find_many("issues", doc! { "project": "apitest" }).await.unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(id.len(), 24);
/// # });
/// ```
#[async_trait]
pub trait DocumentBackend: NoSQLBackend {
	/// Finds a single document matching the filter
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

	/// Finds all documents matching the filter, in the store's natural order
	async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

	/// Inserts a single document into the collection
	///
	/// A document without `_id` is given a fresh ObjectId. Returns the id as
	/// a string (hex for ObjectIds).
	async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

	/// Updates the first document matching the filter
	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult>;

	/// Deletes the first document matching the filter
	///
	/// Returns the number of documents deleted (0 or 1).
	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64>;

	/// Updates the first document matching the filter and returns it as it
	/// is after the update, or `None` if nothing matched
	///
	/// The match and the write happen as one atomic store operation.
	async fn find_one_and_update(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<Option<Document>>;

	/// Removes the first document matching the filter and returns it, or
	/// `None` if nothing matched
	async fn find_one_and_delete(
		&self,
		collection: &str,
		filter: Document,
	) -> Result<Option<Document>>;
}
