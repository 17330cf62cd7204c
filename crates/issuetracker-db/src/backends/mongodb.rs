//! MongoDB backend
//!
//! # Example
//!
//! ```rust,no_run
//! use issuetracker_db::{DocumentBackend, MongoDBBackend};
//! use bson::doc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MongoDBBackend::connect("mongodb://localhost:27017")
//!     .await?
//!     .with_database("issuetracker");
//!
//! let id = backend
//!     .insert_one("issues", doc! { "project": "apitest", "issue_title": "Fix" })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bson::{Document, doc};
use futures::stream::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Database};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NoSQLError, Result};
use crate::traits::{DocumentBackend, NoSQLBackend};
use crate::types::{NoSQLBackendType, UpdateResult, id_to_string};

/// MongoDB backend sharing one pooled client
#[derive(Clone)]
pub struct MongoDBBackend {
	client: Arc<Client>,
	database_name: String,
}

/// Builder for configuring MongoDB connections
///
/// ```rust,no_run
/// use issuetracker_db::MongoDBBackendBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MongoDBBackendBuilder::new()
///     .url("mongodb://localhost:27017")
///     .database("issuetracker")
///     .max_pool_size(20)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct MongoDBBackendBuilder {
	url: String,
	database: String,
	max_pool_size: Option<u32>,
	min_pool_size: Option<u32>,
	connect_timeout_secs: Option<u64>,
}

impl Default for MongoDBBackendBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl MongoDBBackendBuilder {
	pub fn new() -> Self {
		Self {
			url: "mongodb://localhost:27017".to_string(),
			database: "issuetracker".to_string(),
			max_pool_size: None,
			min_pool_size: None,
			connect_timeout_secs: None,
		}
	}

	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.database = database.into();
		self
	}

	pub fn max_pool_size(mut self, size: u32) -> Self {
		self.max_pool_size = Some(size);
		self
	}

	pub fn min_pool_size(mut self, size: u32) -> Self {
		self.min_pool_size = Some(size);
		self
	}

	/// Bound the time spent establishing each connection
	pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
		self.connect_timeout_secs = Some(secs);
		self
	}

	/// Parse the connection string and create the client
	///
	/// The driver connects lazily, so an unreachable server surfaces on the
	/// first operation (or [`NoSQLBackend::health_check`]), not here.
	pub async fn build(self) -> Result<MongoDBBackend> {
		use mongodb::options::ClientOptions;

		let mut options = ClientOptions::parse(&self.url)
			.await
			.map_err(|e| NoSQLError::ConnectionError(e.to_string()))?;

		if let Some(max_size) = self.max_pool_size {
			options.max_pool_size = Some(max_size);
		}
		if let Some(min_size) = self.min_pool_size {
			options.min_pool_size = Some(min_size);
		}
		if let Some(secs) = self.connect_timeout_secs {
			options.connect_timeout = Some(Duration::from_secs(secs));
		}

		let client = Client::with_options(options)
			.map_err(|e| NoSQLError::ConnectionError(e.to_string()))?;

		tracing::debug!(database = %self.database, "mongodb client created");

		Ok(MongoDBBackend {
			client: Arc::new(client),
			database_name: self.database,
		})
	}
}

impl MongoDBBackend {
	/// Connect using a connection string, with the default database
	pub async fn connect(url: &str) -> Result<Self> {
		MongoDBBackendBuilder::new().url(url).build().await
	}

	pub fn builder() -> MongoDBBackendBuilder {
		MongoDBBackendBuilder::new()
	}

	/// Switch to another database on the same client
	pub fn with_database(mut self, database_name: &str) -> Self {
		self.database_name = database_name.to_string();
		self
	}

	pub fn database_name(&self) -> &str {
		&self.database_name
	}

	pub fn database(&self) -> Database {
		self.client.database(&self.database_name)
	}

	fn collection(&self, name: &str) -> mongodb::Collection<Document> {
		self.database().collection::<Document>(name)
	}
}

#[async_trait]
impl NoSQLBackend for MongoDBBackend {
	fn backend_type(&self) -> NoSQLBackendType {
		NoSQLBackendType::MongoDB
	}

	async fn health_check(&self) -> Result<()> {
		self.database()
			.run_command(doc! { "ping": 1 })
			.await
			.map_err(|e| NoSQLError::ConnectionError(format!("Health check failed: {}", e)))?;
		Ok(())
	}

	fn as_any(&self) -> &dyn std::any::Any {
		self
	}
}

#[async_trait]
impl DocumentBackend for MongoDBBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		self.collection(collection)
			.find_one(filter)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))
	}

	async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
		let cursor = self
			.collection(collection)
			.find(filter)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))?;

		cursor
			.try_collect()
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))
	}

	async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
		let result = self
			.collection(collection)
			.insert_one(document)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))?;

		Ok(id_to_string(&result.inserted_id))
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<UpdateResult> {
		let result = self
			.collection(collection)
			.update_one(filter, update)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))?;

		let upserted_id = result.upserted_id.as_ref().map(id_to_string);

		Ok(UpdateResult::new(
			result.matched_count,
			result.modified_count,
			u64::from(upserted_id.is_some()),
			upserted_id,
		))
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		let result = self
			.collection(collection)
			.delete_one(filter)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))?;

		Ok(result.deleted_count)
	}

	async fn find_one_and_update(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<Option<Document>> {
		self.collection(collection)
			.find_one_and_update(filter, update)
			.return_document(ReturnDocument::After)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))
	}

	async fn find_one_and_delete(
		&self,
		collection: &str,
		filter: Document,
	) -> Result<Option<Document>> {
		self.collection(collection)
			.find_one_and_delete(filter)
			.await
			.map_err(|e| NoSQLError::ExecutionError(e.to_string()))
	}
}
