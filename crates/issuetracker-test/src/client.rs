//! In-process API client
//!
//! Builds [`Request`]s and hands them straight to a [`Handler`], the way the
//! server would after reading them off a socket. Handler errors are rendered
//! to responses with the same conversion the server uses.

use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use issuetracker_http::{Handler, Request, Response};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::response::TestResponse;

#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Request error: {0}")]
	Http(#[from] issuetracker_http::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Form encoding error: {0}")]
	FormEncoding(#[from] serde_urlencoded::ser::Error),

	#[error("Unsupported body format: {0}")]
	UnsupportedFormat(String),

	#[error("Invalid header: {0}")]
	InvalidHeader(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Test client for making API requests against a handler
///
/// Body helpers take a `format` of `"json"` or `"form"`.
///
/// ```rust
/// use issuetracker_http::{Handler, Request, Response, Result};
/// use issuetracker_test::APIClient;
/// use async_trait::async_trait;
///
/// struct Hello;
///
/// #[async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, _request: Request) -> Result<Response> {
///         Ok(Response::ok().with_body("hello"))
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let client = APIClient::new(Hello);
/// let response = client.get("/").await.unwrap();
/// assert_eq!(response.text(), "hello");
/// # });
/// ```
pub struct APIClient {
	handler: Arc<dyn Handler>,
	default_headers: HeaderMap,
}

impl APIClient {
	pub fn new(handler: impl Handler + 'static) -> Self {
		Self::from_handler(Arc::new(handler))
	}

	pub fn from_handler(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			default_headers: HeaderMap::new(),
		}
	}

	/// Set a header sent with every request
	pub fn set_header(&mut self, name: &str, value: &str) -> ClientResult<()> {
		let name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
		let value =
			HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(value.to_string()))?;
		self.default_headers.insert(name, value);
		Ok(())
	}

	pub async fn get(&self, path: &str) -> ClientResult<TestResponse> {
		self.request(Method::GET, path, None, None).await
	}

	pub async fn post<T: Serialize>(
		&self,
		path: &str,
		data: &T,
		format: &str,
	) -> ClientResult<TestResponse> {
		let (body, content_type) = Self::serialize_data(data, format)?;
		self.request(Method::POST, path, Some(body), Some(content_type))
			.await
	}

	pub async fn put<T: Serialize>(
		&self,
		path: &str,
		data: &T,
		format: &str,
	) -> ClientResult<TestResponse> {
		let (body, content_type) = Self::serialize_data(data, format)?;
		self.request(Method::PUT, path, Some(body), Some(content_type))
			.await
	}

	/// DELETE with a body; the issue API identifies the target in the body
	pub async fn delete<T: Serialize>(
		&self,
		path: &str,
		data: &T,
		format: &str,
	) -> ClientResult<TestResponse> {
		let (body, content_type) = Self::serialize_data(data, format)?;
		self.request(Method::DELETE, path, Some(body), Some(content_type))
			.await
	}

	pub async fn options(&self, path: &str) -> ClientResult<TestResponse> {
		self.request(Method::OPTIONS, path, None, None).await
	}

	/// Send a raw body without serialization
	pub async fn send_raw(
		&self,
		method: Method,
		path: &str,
		body: impl Into<Bytes>,
		content_type: &str,
	) -> ClientResult<TestResponse> {
		self.request(method, path, Some(body.into()), Some(content_type))
			.await
	}

	/// Build and dispatch a request
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		body: Option<Bytes>,
		content_type: Option<&str>,
	) -> ClientResult<TestResponse> {
		let mut builder = Request::builder()
			.method(method)
			.uri(path)
			.headers(self.default_headers.clone());
		if let Some(content_type) = content_type {
			builder = builder.header(CONTENT_TYPE.as_str(), content_type);
		}
		if let Some(body) = body {
			builder = builder.body(body);
		}
		let request = builder.build()?;

		let response = match self.handler.handle(request).await {
			Ok(response) => response,
			Err(err) => Response::from(err),
		};
		Ok(TestResponse::from(response))
	}

	fn serialize_data<T: Serialize>(data: &T, format: &str) -> ClientResult<(Bytes, &'static str)> {
		match format {
			"json" => Ok((
				Bytes::from(serde_json::to_vec(data)?),
				"application/json",
			)),
			"form" => Ok((
				Bytes::from(serde_urlencoded::to_string(data)?),
				"application/x-www-form-urlencoded",
			)),
			other => Err(ClientError::UnsupportedFormat(other.to_string())),
		}
	}
}
