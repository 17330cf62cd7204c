//! Issue persistence over a document backend

use bson::oid::ObjectId;
use bson::{Document, doc};
use issuetracker_db::{DocumentBackend, Result};
use std::sync::Arc;

use super::models::{self, Issue};

/// Issue collection handle
///
/// Cheap to clone; every clone shares the same backend.
#[derive(Clone)]
pub struct IssueStore {
	backend: Arc<dyn DocumentBackend>,
	collection: String,
}

impl IssueStore {
	pub fn new(backend: Arc<dyn DocumentBackend>, collection: impl Into<String>) -> Self {
		Self {
			backend,
			collection: collection.into(),
		}
	}

	pub fn collection(&self) -> &str {
		&self.collection
	}

	pub async fn health_check(&self) -> Result<()> {
		self.backend.health_check().await
	}

	/// Persist a new issue and return it as stored
	///
	/// The returned issue is decoded from the inserted document, so it
	/// carries the store's millisecond timestamps without a second read.
	pub async fn create(&self, issue: &Issue) -> Result<Issue> {
		let document = issue.to_document();
		self.backend
			.insert_one(&self.collection, document.clone())
			.await?;

		Issue::from_document(&document)
	}

	/// Issues matching `filter`, in the store's natural order
	pub async fn find(&self, filter: Document) -> Result<Vec<Issue>> {
		self.backend
			.find_many(&self.collection, filter)
			.await?
			.iter()
			.map(Issue::from_document)
			.collect()
	}

	/// Apply `set` to the issue with `id` and return the updated issue,
	/// or `None` if no issue has that id
	pub async fn update_by_id(&self, id: ObjectId, set: Document) -> Result<Option<Issue>> {
		self.backend
			.find_one_and_update(&self.collection, doc! { "_id": id }, doc! { "$set": set })
			.await?
			.as_ref()
			.map(Issue::from_document)
			.transpose()
	}

	/// Remove the issue with `id` and return it, or `None` if no issue has
	/// that id
	pub async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Issue>> {
		self.backend
			.find_one_and_delete(&self.collection, doc! { "_id": id })
			.await?
			.as_ref()
			.map(Issue::from_document)
			.transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apps::issues::serializers::CreateIssueSerializer;
	use chrono::{Duration, Utc};
	use issuetracker_db::MemoryBackend;
	use rstest::*;

	#[fixture]
	fn store() -> IssueStore {
		IssueStore::new(Arc::new(MemoryBackend::new()), "issues")
	}

	fn new_issue(project: &str, title: &str) -> Issue {
		CreateIssueSerializer {
			issue_title: title.to_string(),
			issue_text: "text".to_string(),
			created_by: "tester".to_string(),
			..Default::default()
		}
		.into_issue(project, Utc::now())
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_then_find_by_project(store: IssueStore) {
		// Arrange
		store.create(&new_issue("alpha", "one")).await.unwrap();
		store.create(&new_issue("beta", "two")).await.unwrap();
		store.create(&new_issue("alpha", "three")).await.unwrap();

		// Act
		let found = store.find(doc! { "project": "alpha" }).await.unwrap();

		// Assert
		let titles: Vec<&str> = found.iter().map(|i| i.issue_title.as_str()).collect();
		assert_eq!(titles, vec!["one", "three"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_by_id_returns_updated_issue(store: IssueStore) {
		// Arrange
		let issue = store.create(&new_issue("alpha", "one")).await.unwrap();
		let later = issue.updated_on + Duration::seconds(5);

		// Act
		let updated = store
			.update_by_id(
				issue.id,
				doc! {
					"status_text": "Done",
					"updated_on": models::to_bson_datetime(later),
				},
			)
			.await
			.unwrap()
			.unwrap();

		// Assert
		assert_eq!(updated.status_text, "Done");
		assert_eq!(updated.updated_on, later);
		assert_eq!(updated.created_on, issue.created_on);
		assert_eq!(updated.issue_title, "one");
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_unknown_id_is_none(store: IssueStore) {
		let result = store
			.update_by_id(ObjectId::new(), doc! { "open": false })
			.await
			.unwrap();
		assert!(result.is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_delete_by_id_twice(store: IssueStore) {
		// Arrange
		let issue = store.create(&new_issue("alpha", "one")).await.unwrap();

		// Act
		let first = store.delete_by_id(issue.id).await.unwrap();
		let second = store.delete_by_id(issue.id).await.unwrap();

		// Assert
		assert_eq!(first.map(|i| i.id), Some(issue.id));
		assert!(second.is_none());
	}
}
