//! Backend implementations and URL-based selection

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongodb;

use std::sync::Arc;

use crate::error::{NoSQLError, Result};
use crate::traits::DocumentBackend;

/// Open the document store named by `url`
///
/// `memory://` selects the in-process store. `mongodb://` and
/// `mongodb+srv://` need the `mongodb` feature; `database` picks the
/// database on that server.
///
/// ```rust
/// use issuetracker_db::NoSQLBackend;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = issuetracker_db::connect("memory://", "issuetracker").await.unwrap();
/// assert_eq!(store.backend_type().to_string(), "memory");
/// # });
/// ```
pub async fn connect(url: &str, database: &str) -> Result<Arc<dyn DocumentBackend>> {
	let scheme = url.split_once("://").map(|(scheme, _)| scheme);

	match scheme {
		Some("memory") => {
			tracing::debug!("using in-memory document store");
			Ok(Arc::new(memory::MemoryBackend::new()))
		}
		Some("mongodb") | Some("mongodb+srv") => connect_mongodb(url, database).await,
		_ => Err(NoSQLError::ConfigError(format!(
			"unsupported database url '{}': expected memory://, mongodb:// or mongodb+srv://",
			url
		))),
	}
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(url: &str, database: &str) -> Result<Arc<dyn DocumentBackend>> {
	let backend = mongodb::MongoDBBackend::builder()
		.url(url)
		.database(database)
		.build()
		.await?;
	tracing::debug!(database, "using mongodb document store");
	Ok(Arc::new(backend))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_url: &str, _database: &str) -> Result<Arc<dyn DocumentBackend>> {
	Err(NoSQLError::UnsupportedFeature(
		"MongoDB support requires the 'mongodb' feature".to_string(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::traits::NoSQLBackend;
	use crate::types::NoSQLBackendType;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_connect_memory() {
		let store = connect("memory://", "issuetracker").await.unwrap();
		assert_eq!(store.backend_type(), NoSQLBackendType::Memory);
	}

	#[rstest]
	#[case("postgres://localhost/db")]
	#[case("issuetracker")]
	#[case("")]
	#[tokio::test]
	async fn test_connect_rejects_unknown_scheme(#[case] url: &str) {
		let result = connect(url, "issuetracker").await;
		assert!(matches!(result, Err(NoSQLError::ConfigError(_))));
	}

	#[cfg(not(feature = "mongodb"))]
	#[rstest]
	#[tokio::test]
	async fn test_connect_mongodb_without_feature() {
		let result = connect("mongodb://localhost:27017", "issuetracker").await;
		assert!(matches!(result, Err(NoSQLError::UnsupportedFeature(_))));
	}
}
