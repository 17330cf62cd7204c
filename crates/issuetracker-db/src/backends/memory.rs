//! In-memory document store
//!
//! Keeps each collection as an insertion-ordered map from document id to
//! document. Filters compare top-level fields with exact equality and only
//! the `$set` update operator is supported, which is all the issue
//! tracker needs.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{NoSQLError, Result};
use crate::traits::{DocumentBackend, NoSQLBackend};
use crate::types::{NoSQLBackendType, UpdateResult, id_to_string};

type Collection = IndexMap<String, Document>;

/// In-memory backend
///
/// # Example
///
/// ```rust
/// use issuetracker_db::{DocumentBackend, MemoryBackend};
/// use bson::doc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let db = MemoryBackend::new();
/// db.insert_one("issues", doc! { "issue_title": "Fix" }).await.unwrap();
///
/// let result = db
///     .update_one("issues", doc! { "issue_title": "Fix" }, doc! { "$set": { "open": false } })
///     .await
///     .unwrap();
/// assert_eq!(result.matched_count, 1);
/// # });
/// ```
#[derive(Default)]
pub struct MemoryBackend {
	collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of documents stored in `collection`
	pub fn count(&self, collection: &str) -> usize {
		self.collections
			.read()
			.get(collection)
			.map_or(0, IndexMap::len)
	}
}

fn matches(document: &Document, filter: &Document) -> Result<bool> {
	for (key, expected) in filter {
		if key.starts_with('$') {
			return Err(NoSQLError::UnsupportedFeature(format!(
				"query operator '{}' is not supported by the memory backend",
				key
			)));
		}
		if document.get(key) != Some(expected) {
			return Ok(false);
		}
	}
	Ok(true)
}

fn set_fields(update: &Document) -> Result<&Document> {
	let mut set = None;
	for (key, value) in update {
		match (key.as_str(), value) {
			("$set", Bson::Document(fields)) => set = Some(fields),
			("$set", _) => {
				return Err(NoSQLError::InvalidOperation(
					"$set expects a document".to_string(),
				));
			}
			(op, _) if op.starts_with('$') => {
				return Err(NoSQLError::UnsupportedFeature(format!(
					"update operator '{}' is not supported by the memory backend",
					op
				)));
			}
			(field, _) => {
				return Err(NoSQLError::InvalidOperation(format!(
					"update document must only contain operators, found '{}'",
					field
				)));
			}
		}
	}

	let set = set.ok_or_else(|| NoSQLError::InvalidOperation("empty update document".to_string()))?;
	if set.contains_key("_id") {
		return Err(NoSQLError::InvalidOperation(
			"the _id field is immutable".to_string(),
		));
	}
	Ok(set)
}

#[async_trait]
impl NoSQLBackend for MemoryBackend {
	fn backend_type(&self) -> NoSQLBackendType {
		NoSQLBackendType::Memory
	}

	async fn health_check(&self) -> Result<()> {
		Ok(())
	}

	fn as_any(&self) -> &dyn std::any::Any {
		self
	}
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		let collections = self.collections.read();
		let Some(docs) = collections.get(collection) else {
			return Ok(None);
		};

		for document in docs.values() {
			if matches(document, &filter)? {
				return Ok(Some(document.clone()));
			}
		}
		Ok(None)
	}

	async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
		let collections = self.collections.read();
		let Some(docs) = collections.get(collection) else {
			return Ok(Vec::new());
		};

		let mut found = Vec::new();
		for document in docs.values() {
			if matches(document, &filter)? {
				found.push(document.clone());
			}
		}
		Ok(found)
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String> {
		let id = match document.get("_id") {
			Some(id) => id.clone(),
			None => {
				let id = Bson::ObjectId(ObjectId::new());
				document.insert("_id", id.clone());
				id
			}
		};
		let key = id_to_string(&id);

		let mut collections = self.collections.write();
		let docs = collections.entry(collection.to_string()).or_default();
		if docs.contains_key(&key) {
			return Err(NoSQLError::ExecutionError(format!(
				"duplicate key: _id {} already exists in {}",
				key, collection
			)));
		}
		docs.insert(key.clone(), document);

		tracing::trace!(collection, id = %key, "document inserted");
		Ok(key)
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		Ok(match self.update_first(collection, &filter, &update)? {
			Some((modified, _)) => UpdateResult::new(1, u64::from(modified), 0, None),
			None => UpdateResult::default(),
		})
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		Ok(u64::from(self.remove_first(collection, &filter)?.is_some()))
	}

	async fn find_one_and_update(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<Option<Document>> {
		Ok(self
			.update_first(collection, &filter, &update)?
			.map(|(_, document)| document))
	}

	async fn find_one_and_delete(
		&self,
		collection: &str,
		filter: Document,
	) -> Result<Option<Document>> {
		self.remove_first(collection, &filter)
	}
}

impl MemoryBackend {
	/// Apply a `$set` update to the first match under one write lock
	///
	/// Returns whether any field changed and the document after the update.
	fn update_first(
		&self,
		collection: &str,
		filter: &Document,
		update: &Document,
	) -> Result<Option<(bool, Document)>> {
		let set = set_fields(update)?;

		let mut collections = self.collections.write();
		let Some(docs) = collections.get_mut(collection) else {
			return Ok(None);
		};

		for document in docs.values_mut() {
			if !matches(document, filter)? {
				continue;
			}

			let mut modified = false;
			for (field, value) in set {
				if document.get(field) != Some(value) {
					document.insert(field.clone(), value.clone());
					modified = true;
				}
			}
			return Ok(Some((modified, document.clone())));
		}

		Ok(None)
	}

	/// Remove the first match under one write lock
	fn remove_first(&self, collection: &str, filter: &Document) -> Result<Option<Document>> {
		let mut collections = self.collections.write();
		let Some(docs) = collections.get_mut(collection) else {
			return Ok(None);
		};

		let mut target = None;
		for (key, document) in docs.iter() {
			if matches(document, filter)? {
				target = Some(key.clone());
				break;
			}
		}

		Ok(target.and_then(|key| docs.shift_remove(&key)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bson::doc;
	use rstest::*;

	#[fixture]
	fn backend() -> MemoryBackend {
		MemoryBackend::new()
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_assigns_object_id(backend: MemoryBackend) {
		// Act
		let id = backend
			.insert_one("issues", doc! { "issue_title": "Fix" })
			.await
			.unwrap();

		// Assert
		let oid = ObjectId::parse_str(&id).unwrap();
		let stored = backend
			.find_one("issues", doc! { "_id": oid })
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.get_str("issue_title").unwrap(), "Fix");
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_rejects_duplicate_id(backend: MemoryBackend) {
		// Arrange
		let oid = ObjectId::new();
		backend.insert_one("issues", doc! { "_id": oid }).await.unwrap();

		// Act
		let result = backend.insert_one("issues", doc! { "_id": oid }).await;

		// Assert
		assert!(matches!(result, Err(NoSQLError::ExecutionError(_))));
		assert_eq!(backend.count("issues"), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_many_filters_and_keeps_insertion_order(backend: MemoryBackend) {
		// Arrange
		for (title, project) in [("a", "x"), ("b", "y"), ("c", "x"), ("d", "x")] {
			backend
				.insert_one("issues", doc! { "issue_title": title, "project": project })
				.await
				.unwrap();
		}

		// Act
		let found = backend
			.find_many("issues", doc! { "project": "x" })
			.await
			.unwrap();

		// Assert
		let titles: Vec<&str> = found
			.iter()
			.map(|d| d.get_str("issue_title").unwrap())
			.collect();
		assert_eq!(titles, vec!["a", "c", "d"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_in_unknown_collection_is_empty(backend: MemoryBackend) {
		assert!(backend.find_many("nope", doc! {}).await.unwrap().is_empty());
		assert!(backend.find_one("nope", doc! {}).await.unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_filter_equality_is_type_sensitive(backend: MemoryBackend) {
		// Arrange
		backend.insert_one("issues", doc! { "open": true }).await.unwrap();

		// Act
		let by_bool = backend.find_many("issues", doc! { "open": true }).await.unwrap();
		let by_string = backend.find_many("issues", doc! { "open": "true" }).await.unwrap();

		// Assert
		assert_eq!(by_bool.len(), 1);
		assert!(by_string.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_one_sets_only_given_fields(backend: MemoryBackend) {
		// Arrange
		let id = backend
			.insert_one("issues", doc! { "issue_title": "Fix", "issue_text": "Body" })
			.await
			.unwrap();
		let oid = ObjectId::parse_str(&id).unwrap();

		// Act
		let result = backend
			.update_one(
				"issues",
				doc! { "_id": oid },
				doc! { "$set": { "issue_text": "Changed" } },
			)
			.await
			.unwrap();

		// Assert
		assert_eq!(result, UpdateResult::new(1, 1, 0, None));
		let stored = backend
			.find_one("issues", doc! { "_id": oid })
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.get_str("issue_title").unwrap(), "Fix");
		assert_eq!(stored.get_str("issue_text").unwrap(), "Changed");
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_one_without_match(backend: MemoryBackend) {
		// Act
		let result = backend
			.update_one(
				"issues",
				doc! { "_id": ObjectId::new() },
				doc! { "$set": { "open": false } },
			)
			.await
			.unwrap();

		// Assert
		assert_eq!(result.matched_count, 0);
	}

	#[rstest]
	#[case(doc! { "$inc": { "n": 1 } })]
	#[case(doc! { "issue_title": "raw replacement" })]
	#[case(doc! { "$set": { "_id": "other" } })]
	#[case(doc! {})]
	#[tokio::test]
	async fn test_update_one_rejects_unsupported_updates(
		backend: MemoryBackend,
		#[case] update: Document,
	) {
		// Arrange
		backend.insert_one("issues", doc! { "n": 0 }).await.unwrap();

		// Act
		let result = backend.update_one("issues", doc! {}, update).await;

		// Assert
		assert!(result.is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_delete_one_removes_first_match(backend: MemoryBackend) {
		// Arrange
		let id = backend.insert_one("issues", doc! { "n": 1 }).await.unwrap();
		backend.insert_one("issues", doc! { "n": 2 }).await.unwrap();
		let oid = ObjectId::parse_str(&id).unwrap();

		// Act
		let first = backend.delete_one("issues", doc! { "_id": oid }).await.unwrap();
		let second = backend.delete_one("issues", doc! { "_id": oid }).await.unwrap();

		// Assert
		assert_eq!(first, 1);
		assert_eq!(second, 0);
		assert_eq!(backend.count("issues"), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_one_and_update_returns_updated_document(backend: MemoryBackend) {
		// Arrange
		let id = backend
			.insert_one("issues", doc! { "issue_title": "Fix", "open": true })
			.await
			.unwrap();
		let oid = ObjectId::parse_str(&id).unwrap();

		// Act
		let updated = backend
			.find_one_and_update("issues", doc! { "_id": oid }, doc! { "$set": { "open": false } })
			.await
			.unwrap();
		let missing = backend
			.find_one_and_update(
				"issues",
				doc! { "_id": ObjectId::new() },
				doc! { "$set": { "open": false } },
			)
			.await
			.unwrap();

		// Assert
		let updated = updated.unwrap();
		assert!(!updated.get_bool("open").unwrap());
		assert_eq!(updated.get_str("issue_title").unwrap(), "Fix");
		assert!(missing.is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_find_one_and_delete_returns_removed_document(backend: MemoryBackend) {
		// Arrange
		let id = backend.insert_one("issues", doc! { "n": 1 }).await.unwrap();
		let oid = ObjectId::parse_str(&id).unwrap();

		// Act
		let first = backend
			.find_one_and_delete("issues", doc! { "_id": oid })
			.await
			.unwrap();
		let second = backend
			.find_one_and_delete("issues", doc! { "_id": oid })
			.await
			.unwrap();

		// Assert
		assert_eq!(first.unwrap().get_i32("n").unwrap(), 1);
		assert!(second.is_none());
		assert_eq!(backend.count("issues"), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_query_operators_are_unsupported(backend: MemoryBackend) {
		// Arrange
		backend.insert_one("issues", doc! { "n": 1 }).await.unwrap();

		// Act
		let result = backend
			.find_many("issues", doc! { "$or": [ { "n": 1 } ] })
			.await;

		// Assert
		assert!(matches!(result, Err(NoSQLError::UnsupportedFeature(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_health_check_and_type(backend: MemoryBackend) {
		assert!(backend.health_check().await.is_ok());
		assert_eq!(backend.backend_type(), NoSQLBackendType::Memory);
		assert!(backend.as_any().downcast_ref::<MemoryBackend>().is_some());
	}
}
