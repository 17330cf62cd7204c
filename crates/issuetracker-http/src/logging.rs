use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::{Handler, Middleware, Request, Response, Result};

/// Logging middleware
///
/// Logs method, path, status code and duration of every request through
/// `tracing`. Handler errors are logged at `error` and passed through.
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	/// Create a new logging middleware
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use issuetracker_http::{Handler, LoggingMiddleware, Middleware, Request, Response, Result};
	/// use hyper::StatusCode;
	///
	/// struct TestHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for TestHandler {
	///     async fn handle(&self, _request: Request) -> Result<Response> {
	///         Ok(Response::ok().with_body("OK"))
	///     }
	/// }
	///
	/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
	/// let middleware = LoggingMiddleware::new();
	/// let request = Request::builder().uri("/api/issues/apitest").build().unwrap();
	///
	/// let response = middleware.process(request, Arc::new(TestHandler)).await.unwrap();
	/// assert_eq!(response.status, StatusCode::OK);
	/// # });
	/// ```
	pub fn new() -> Self {
		Self
	}
}

impl Default for LoggingMiddleware {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Utc::now();
		let method = request.method.to_string();
		let path = request.path().to_string();

		let result = next.handle(request).await;

		let elapsed_ms = Utc::now().signed_duration_since(start).num_milliseconds();

		match &result {
			Ok(response) => {
				tracing::info!(
					%method,
					%path,
					status = response.status.as_u16(),
					elapsed_ms,
					"request handled"
				);
			}
			Err(err) => {
				tracing::error!(%method, %path, error = %err, elapsed_ms, "request failed");
			}
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use hyper::StatusCode;
	use rstest::rstest;

	struct FailingHandler;

	#[async_trait]
	impl Handler for FailingHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Err(Error::Internal("store offline".to_string()))
		}
	}

	struct OkHandler;

	#[async_trait]
	impl Handler for OkHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::new(StatusCode::CREATED))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_logging_passes_response_through() {
		// Arrange
		let request = Request::builder().uri("/api/issues/x").build().unwrap();

		// Act
		let response = LoggingMiddleware::new()
			.process(request, Arc::new(OkHandler))
			.await
			.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::CREATED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_logging_passes_error_through() {
		// Arrange
		let request = Request::builder().uri("/api/issues/x").build().unwrap();

		// Act
		let result = LoggingMiddleware::default()
			.process(request, Arc::new(FailingHandler))
			.await;

		// Assert
		assert!(matches!(result, Err(Error::Internal(msg)) if msg == "store offline"));
	}
}
