//! HTTP request representation.

mod body;
mod params;

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::{Error, Result};

/// HTTP Request representation
///
/// The body is fully buffered by the server before the request reaches a
/// handler. Query parameters are decoded once at construction; path
/// parameters are filled in by the router.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	body: Bytes,
	/// Parameters extracted from the matched route pattern
	pub path_params: HashMap<String, String>,
	/// URL-decoded query string parameters
	pub query_params: HashMap<String, String>,
	/// Peer address of the connection, when known
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	/// Create a new request from its raw parts
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker_http::Request;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::GET,
	///     Uri::from_static("/api/issues/apitest?open=true"),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::new(),
	/// );
	/// assert_eq!(request.path(), "/api/issues/apitest");
	/// assert_eq!(request.query_params.get("open"), Some(&"true".to_string()));
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		let query_params = Self::parse_query_params(&uri);
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			query_params,
			remote_addr: None,
		}
	}

	/// Start building a request
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Raw request body
	pub fn body(&self) -> &Bytes {
		&self.body
	}
}

/// Builder for [`Request`], mostly used by tests and the in-process client
///
/// # Examples
///
/// ```
/// use issuetracker_http::Request;
/// use hyper::Method;
///
/// let request = Request::builder()
///     .method(Method::POST)
///     .uri("/api/issues/apitest")
///     .header("content-type", "application/json")
///     .body(r#"{"issue_title":"Fix"}"#)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method, Method::POST);
/// assert_eq!(request.body().len(), 21);
/// ```
#[derive(Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header; invalid names or values are ignored
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			hyper::header::HeaderName::from_bytes(name.as_bytes()),
			hyper::header::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	/// Build the request
	///
	/// # Errors
	///
	/// Returns [`Error::BadRequest`] if the URI does not parse.
	pub fn build(self) -> Result<Request> {
		let uri = match self.uri {
			Some(raw) => raw
				.parse::<Uri>()
				.map_err(|e| Error::BadRequest(format!("Invalid URI '{}': {}", raw, e)))?,
			None => Uri::from_static("/"),
		};

		let mut request = Request::new(self.method, uri, self.version, self.headers, self.body);
		request.remote_addr = self.remote_addr;
		Ok(request)
	}
}
