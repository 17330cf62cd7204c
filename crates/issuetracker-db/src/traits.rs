//! Backend traits

mod document;

pub use document::DocumentBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::NoSQLBackendType;

/// Base trait for every NoSQL backend
#[async_trait]
pub trait NoSQLBackend: Send + Sync {
	fn backend_type(&self) -> NoSQLBackendType;

	/// Check that the backend is reachable
	async fn health_check(&self) -> Result<()>;

	/// Downcasting hook for backend-specific access
	fn as_any(&self) -> &dyn std::any::Any;
}
