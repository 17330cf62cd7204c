//! rstest fixtures for stores and live servers

use async_trait::async_trait;
use issuetracker_db::{
	Document, DocumentBackend, MemoryBackend, NoSQLBackend, NoSQLBackendType, NoSQLError,
	UpdateResult,
};
use issuetracker_http::Handler;
use issuetracker_server::{HttpServer, ShutdownCoordinator};
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Fresh in-memory document store
#[fixture]
pub fn memory_backend() -> Arc<MemoryBackend> {
	Arc::new(MemoryBackend::new())
}

/// Store whose every operation fails, for exercising error paths
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingBackend;

impl FailingBackend {
	fn error(operation: &str) -> NoSQLError {
		NoSQLError::ConnectionError(format!("{} failed: store unavailable", operation))
	}
}

#[async_trait]
impl NoSQLBackend for FailingBackend {
	fn backend_type(&self) -> NoSQLBackendType {
		NoSQLBackendType::Memory
	}

	async fn health_check(&self) -> issuetracker_db::Result<()> {
		Err(Self::error("health check"))
	}

	fn as_any(&self) -> &dyn std::any::Any {
		self
	}
}

#[async_trait]
impl DocumentBackend for FailingBackend {
	async fn find_one(&self, _: &str, _: Document) -> issuetracker_db::Result<Option<Document>> {
		Err(Self::error("find_one"))
	}

	async fn find_many(&self, _: &str, _: Document) -> issuetracker_db::Result<Vec<Document>> {
		Err(Self::error("find_many"))
	}

	async fn insert_one(&self, _: &str, _: Document) -> issuetracker_db::Result<String> {
		Err(Self::error("insert_one"))
	}

	async fn update_one(
		&self,
		_: &str,
		_: Document,
		_: Document,
	) -> issuetracker_db::Result<UpdateResult> {
		Err(Self::error("update_one"))
	}

	async fn delete_one(&self, _: &str, _: Document) -> issuetracker_db::Result<u64> {
		Err(Self::error("delete_one"))
	}

	async fn find_one_and_update(
		&self,
		_: &str,
		_: Document,
		_: Document,
	) -> issuetracker_db::Result<Option<Document>> {
		Err(Self::error("find_one_and_update"))
	}

	async fn find_one_and_delete(
		&self,
		_: &str,
		_: Document,
	) -> issuetracker_db::Result<Option<Document>> {
		Err(Self::error("find_one_and_delete"))
	}
}

/// Running server that shuts down when dropped
///
/// ```rust,no_run
/// use issuetracker_http::Handler;
/// use issuetracker_test::test_server_guard;
/// use std::sync::Arc;
///
/// # async fn example(handler: Arc<dyn Handler>) {
/// let server = test_server_guard(handler).await;
/// let response = reqwest::get(format!("{}/health", server.url)).await.unwrap();
/// assert_eq!(response.status(), 200);
/// # }
/// ```
pub struct TestServerGuard {
	/// Base URL, e.g. `http://127.0.0.1:49152`
	pub url: String,
	pub coordinator: ShutdownCoordinator,
	server_task: Option<JoinHandle<()>>,
}

impl TestServerGuard {
	async fn new(handler: Arc<dyn Handler>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0")
			.await
			.expect("Failed to bind test listener");
		let addr = listener.local_addr().expect("Failed to read local address");
		let url = format!("http://{}", addr);

		let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
		let server_coordinator = coordinator.clone();
		let server_task = tokio::spawn(async move {
			if let Err(err) = HttpServer::new(handler)
				.serve_with_listener(listener, server_coordinator)
				.await
			{
				tracing::error!(error = %err, "test server failed");
			}
		});

		Self {
			url,
			coordinator,
			server_task: Some(server_task),
		}
	}

	/// Absolute URL for `path`
	pub fn url_for(&self, path: &str) -> String {
		format!("{}{}", self.url, path)
	}
}

impl Drop for TestServerGuard {
	fn drop(&mut self) {
		self.coordinator.shutdown();
		if let Some(task) = self.server_task.take() {
			task.abort();
		}
	}
}

/// Serve `handler` on an ephemeral port
///
/// The listener is bound before the server task starts, so requests can be
/// sent as soon as this returns.
pub async fn test_server_guard(handler: Arc<dyn Handler>) -> TestServerGuard {
	TestServerGuard::new(handler).await
}

/// HTTP client with a bounded timeout
#[fixture]
pub fn http_client() -> reqwest::Client {
	reqwest::Client::builder()
		.timeout(Duration::from_secs(10))
		.build()
		.expect("Failed to create HTTP client")
}
