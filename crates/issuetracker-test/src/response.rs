//! Test response wrapper

use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use issuetracker_http::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Response captured by [`APIClient`](crate::APIClient)
#[derive(Debug)]
pub struct TestResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Bytes,
}

impl TestResponse {
	pub fn with_body(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			status,
			headers,
			body,
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Value of a header, if present and valid UTF-8
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn body(&self) -> &Bytes {
		&self.body
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).to_string()
	}

	pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
		serde_json::from_slice(&self.body)
	}

	pub fn json_value(&self) -> Result<Value, serde_json::Error> {
		serde_json::from_slice(&self.body)
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	pub fn is_client_error(&self) -> bool {
		self.status.is_client_error()
	}

	pub fn is_server_error(&self) -> bool {
		self.status.is_server_error()
	}
}

impl From<Response> for TestResponse {
	fn from(response: Response) -> Self {
		Self::with_body(response.status, response.headers, response.body)
	}
}
