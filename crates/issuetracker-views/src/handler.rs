use async_trait::async_trait;
use hyper::Method;
use issuetracker_http::{Error, Handler, Request, Response, Result};
use std::sync::Arc;

use crate::View;

/// Adapts a [`View`] into a [`Handler`]
///
/// `OPTIONS` is answered with an empty `200` carrying the `Allow` header.
/// Methods the view does not list come back as a JSON `405` with the same
/// header, without reaching [`View::dispatch`].
///
/// # Examples
///
/// ```
/// use issuetracker_http::{Handler, Request, Response, Result};
/// use issuetracker_views::{View, ViewHandler};
/// use hyper::{Method, StatusCode};
///
/// struct Ping;
///
/// #[async_trait::async_trait]
/// impl View for Ping {
///     async fn dispatch(&self, _request: Request) -> Result<Response> {
///         Ok(Response::ok().with_body("pong"))
///     }
///
///     fn allowed_methods(&self) -> Vec<&'static str> {
///         vec!["GET", "OPTIONS"]
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let handler = ViewHandler::new(Ping);
/// let request = Request::builder().method(Method::DELETE).build().unwrap();
/// let response = handler.handle(request).await.unwrap();
///
/// assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
/// assert_eq!(response.headers.get("allow").unwrap(), "GET, OPTIONS");
/// # });
/// ```
pub struct ViewHandler<V: View> {
	view: Arc<V>,
}

impl<V: View> ViewHandler<V> {
	pub fn new(view: V) -> Self {
		Self {
			view: Arc::new(view),
		}
	}

	/// Wrap a view that is already shared
	pub fn from_arc(view: Arc<V>) -> Self {
		Self { view }
	}

	fn allow_header(&self) -> String {
		self.view.allowed_methods().join(", ")
	}
}

#[async_trait]
impl<V: View + 'static> Handler for ViewHandler<V> {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method == Method::OPTIONS {
			return Ok(Response::ok().with_header("Allow", &self.allow_header()));
		}

		let allowed = self
			.view
			.allowed_methods()
			.iter()
			.any(|m| *m == request.method.as_str());

		if !allowed {
			tracing::debug!(
				method = %request.method,
				path = %request.path(),
				"method not allowed"
			);
			let response: Response = Error::MethodNotAllowed(request.method.to_string()).into();
			return Ok(response.with_header("Allow", &self.allow_header()));
		}

		self.view.dispatch(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use rstest::rstest;
	use serde_json::Value;

	struct EchoMethodView;

	#[async_trait]
	impl View for EchoMethodView {
		async fn dispatch(&self, request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(request.method.to_string()))
		}

		fn allowed_methods(&self) -> Vec<&'static str> {
			vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]
		}
	}

	struct DefaultMethodsView;

	#[async_trait]
	impl View for DefaultMethodsView {
		async fn dispatch(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok())
		}
	}

	fn request(method: Method) -> Request {
		Request::builder()
			.method(method)
			.uri("/api/issues/apitest")
			.build()
			.unwrap()
	}

	#[rstest]
	#[case(Method::GET)]
	#[case(Method::POST)]
	#[case(Method::PUT)]
	#[case(Method::DELETE)]
	#[tokio::test]
	async fn test_allowed_methods_reach_dispatch(#[case] method: Method) {
		// Arrange
		let handler = ViewHandler::new(EchoMethodView);

		// Act
		let response = handler.handle(request(method.clone())).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, method.as_str());
	}

	#[rstest]
	#[tokio::test]
	async fn test_disallowed_method_returns_json_405() {
		// Arrange
		let handler = ViewHandler::new(EchoMethodView);

		// Act
		let response = handler.handle(request(Method::PATCH)).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(
			response.headers.get("allow").unwrap(),
			"GET, POST, PUT, DELETE, OPTIONS"
		);
		let body: Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["error"], "Method not allowed: PATCH");
	}

	#[rstest]
	#[tokio::test]
	async fn test_options_lists_allowed_methods() {
		// Arrange
		let handler = ViewHandler::new(DefaultMethodsView);

		// Act
		let response = handler.handle(request(Method::OPTIONS)).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.headers.get("allow").unwrap(), "GET, HEAD, OPTIONS");
		assert!(response.body.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_from_arc_shares_view() {
		// Arrange
		let view = Arc::new(DefaultMethodsView);
		let handler = ViewHandler::from_arc(view.clone());

		// Act
		let response = handler.handle(request(Method::POST)).await.unwrap();

		// Assert
		assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(Arc::strong_count(&view), 2);
	}
}
